use clap::Args;
use lith_rez::{header::HeaderVariant, RezArchive};
use miette::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Args)]
pub struct ListArgs {
    /// An input REZ file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Show resource ids, times and descriptions
    #[arg(short, long, default_value_t = false)]
    long: bool,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let rez = RezArchive::open(&self.file)
            .context(format!("path: {}", &self.file.display()))?;

        let header = rez.header();
        let layout = match &header.variant {
            HeaderVariant::Plain => "plain",
            HeaderVariant::Checksummed(_) => "checksummed",
        };
        println!("{} {}", "file type:".bold(), header.file_type);
        println!("{} {}", "title:    ".bold(), header.user_title);
        println!(
            "{} {layout}, version {}",
            "layout:   ".bold(),
            header.version as u32
        );
        println!(
            "{} {:#x} ({} bytes)",
            "root:     ".bold(),
            header.root.position,
            header.root.size
        );
        if let Some(size) = rez.total_size() {
            println!(
                "{} {} resources, {size} bytes",
                "contents: ".bold(),
                rez.len()
            );
        }

        let tree = rez.tree();
        for (index, directory) in tree.directories().iter().enumerate() {
            let path = tree.segments(index).join("/");
            println!("{}/", path.blue().bold());

            for resource in &directory.resources {
                let file_name = resource.file_name();
                if self.long {
                    println!(
                        "  {file_name:<32} {:>10} {:>8} {:>10} {}",
                        resource.size(),
                        resource.id,
                        resource.header.time,
                        resource.description.dimmed()
                    );
                } else {
                    println!("  {file_name:<32} {:>10}", resource.size());
                }
            }
        }

        Ok(())
    }
}
