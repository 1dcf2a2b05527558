use std::io::{Cursor, Read};

use lith_rez::error::{Error, FileNotFoundError};
use lith_rez::header::{FormatVersion, HeaderVariant};
use lith_rez::RezArchive;
use pretty_assertions::assert_eq;
use tracing::info;
use tracing_test::traced_test;

mod common;
use common::{dir, res, Layout};

fn sample(layout: Layout) -> Vec<u8> {
    common::build(
        layout,
        &[dir(
            "",
            vec![
                res("readme", "TXT", b"hello rez"),
                dir(
                    "Textures",
                    vec![
                        res("icon", "JPG", &[0xFF, 0xD8, 0xFF, 0xE0]),
                        res("wall", "DTX", &[0; 24]),
                    ],
                ),
                dir("Sounds", vec![res("hit", "WAV", b"RIFF")]),
            ],
        )],
    )
}

#[traced_test]
#[test]
fn list_plain_archive() -> Result<(), Error> {
    let rez = RezArchive::new(Cursor::new(sample(Layout::PlainV1)))?;

    assert_eq!(rez.header().version, FormatVersion::V1);
    assert_eq!(rez.header().file_type, common::FILE_TYPE);
    assert_eq!(rez.header().user_title, common::USER_TITLE);
    assert!(rez.header().trailer.is_some());

    let names = rez.file_names().collect::<Vec<_>>();
    info!("archive holds {names:?}");
    assert_eq!(
        names,
        ["readme.TXT", "Textures/icon.JPG", "Textures/wall.DTX", "Sounds/hit.WAV"]
    );
    assert_eq!(rez.tree().len(), 3);
    assert_eq!(rez.total_size(), Some(9 + 4 + 24 + 4));
    assert!(format!("{rez:?}").starts_with("RezArchive(RezHeader"));

    Ok(())
}

#[traced_test]
#[test]
fn list_version_two_archive() -> Result<(), Error> {
    let rez = RezArchive::new(Cursor::new(sample(Layout::PlainV2)))?;

    assert_eq!(rez.header().version, FormatVersion::V2);
    assert!(rez.header().trailer.is_none());
    assert_eq!(rez.len(), 4);

    Ok(())
}

#[traced_test]
#[test]
fn list_checksummed_archive() -> Result<(), Error> {
    let layout = Layout::Checksummed {
        head: 0x42,
        encode: 123_456,
        tail: 0x07,
    };
    let rez = RezArchive::new(Cursor::new(sample(layout)))?;

    assert!(rez.header().is_checksummed());
    assert!(matches!(rez.header().variant, HeaderVariant::Checksummed(_)));
    assert_eq!(rez.len(), 4);

    Ok(())
}

#[traced_test]
#[test]
fn read_by_name_and_index() -> Result<(), Error> {
    let mut rez = RezArchive::new(Cursor::new(sample(Layout::PlainV1)))?;

    let mut contents = Vec::new();
    let mut file = rez.by_name("readme.TXT")?;
    assert_eq!(file.name(), "readme");
    assert_eq!(file.extension(), "TXT");
    assert_eq!(file.size(), 9);
    file.read_to_end(&mut contents)?;
    assert_eq!(contents, b"hello rez");

    let index = rez.index_for_name("Sounds/hit.WAV").unwrap();
    assert_eq!(rez.name_for_index(index), Some("Sounds/hit.WAV"));

    contents.clear();
    rez.by_index(index)?.read_to_end(&mut contents)?;
    assert_eq!(contents, b"RIFF");

    Ok(())
}

#[traced_test]
#[test]
fn missing_resources() -> Result<(), Error> {
    let mut rez = RezArchive::new(Cursor::new(sample(Layout::PlainV1)))?;

    let err = rez.by_name("Textures/missing.JPG").unwrap_err();
    assert!(matches!(
        err,
        Error::FileNotFound(FileNotFoundError::Name(ref name)) if name == "Textures/missing.JPG"
    ));

    let err = rez.by_index(4).unwrap_err();
    assert!(matches!(err, Error::FileNotFound(FileNotFoundError::Index(4))));

    Ok(())
}

#[traced_test]
#[test]
fn reject_corrupted_checksums() {
    let layout = Layout::Checksummed {
        head: 0x42,
        encode: 98_765,
        tail: 0x99,
    };
    let valid = sample(layout);
    assert!(RezArchive::new(Cursor::new(valid.clone())).is_ok());

    for offset in [
        common::DETECT_HEAD_OFFSET,
        common::DETECT_ENCODE_OFFSET,
        common::DETECT_TAIL_OFFSET,
    ] {
        let mut corrupted = valid.clone();
        corrupted[offset] ^= 0x01;

        let err = RezArchive::new(Cursor::new(corrupted)).unwrap_err();
        info!("corruption at {offset} reported as {err}");
        assert!(matches!(err, Error::HeaderIntegrity(_)));
    }
}

#[traced_test]
#[test]
fn reject_bad_sentinel() {
    let mut data = sample(Layout::PlainV1);
    data[0] = b'X';

    let err = RezArchive::new(Cursor::new(data)).unwrap_err();
    assert!(matches!(err, Error::InvalidArchive(_)));
}
