//! Builds synthetic REZ archives for tests and benchmarks.
#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};

pub const FILE_TYPE: &str = "RezMgr Version 1 Copyright (C) 1995 MONOLITH INC.";
pub const USER_TITLE: &str = "LithTech Resource File";

/// Offsets of the checksum fields in a checksummed header
pub const HEAD_OFFSET: usize = 127;
pub const ENCODE_OFFSET: usize = 128;
pub const TAIL_OFFSET: usize = 160;
pub const DETECT_HEAD_OFFSET: usize = 161;
pub const DETECT_ENCODE_OFFSET: usize = 162;
pub const DETECT_TAIL_OFFSET: usize = 194;

#[derive(Debug, Clone)]
pub enum Node {
    Directory {
        name: String,
        children: Vec<Node>,
    },
    Resource {
        id: u32,
        extension: String,
        name: Vec<u8>,
        description: String,
        keys: Vec<u32>,
        payload: Vec<u8>,
    },
}

pub fn dir(name: &str, children: Vec<Node>) -> Node {
    Node::Directory {
        name: name.into(),
        children,
    }
}

pub fn res(name: &str, extension: &str, payload: &[u8]) -> Node {
    res_raw(name.as_bytes(), extension, payload)
}

/// A resource whose name is not valid UTF-8
pub fn res_raw(name: &[u8], extension: &str, payload: &[u8]) -> Node {
    Node::Resource {
        id: 1,
        extension: extension.into(),
        name: name.to_vec(),
        description: String::new(),
        keys: Vec::new(),
        payload: payload.to_vec(),
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Layout {
    PlainV1,
    PlainV2,
    Checksummed { head: u8, encode: i32, tail: u8 },
}

/// Build an archive whose root block holds `root`.
///
/// A resource lands in the directory decoded last, so list a directory's resources before its
/// subdirectories.
pub fn build(layout: Layout, root: &[Node]) -> Vec<u8> {
    let header_len = header(layout, 0, 0).len();

    let mut body = Vec::new();
    let (position, size) = encode_block(root, header_len, &mut body);

    let mut data = header(layout, position, size);
    data.extend(body);
    data
}

fn encode_block(nodes: &[Node], base: usize, body: &mut Vec<u8>) -> (u32, u32) {
    let mut block = Vec::new();

    for node in nodes {
        match node {
            Node::Directory { name, children } => {
                let (position, size) = if children.is_empty() {
                    (0, 0)
                } else {
                    encode_block(children, base, body)
                };

                write_entry(&mut block, 1, position, size);
                block.extend(name.as_bytes());
                block.push(0);
            }
            Node::Resource {
                id,
                extension,
                name,
                description,
                keys,
                payload,
            } => {
                let position = (base + body.len()) as u32;
                body.extend(payload);

                write_entry(&mut block, 0, position, payload.len() as u32);
                block.write_u32::<LittleEndian>(*id).unwrap();

                let mut kind: Vec<u8> = extension.bytes().rev().take(4).collect();
                kind.resize(4, 0);
                block.extend(kind);

                block.write_u32::<LittleEndian>(keys.len() as u32).unwrap();
                block.extend(name);
                block.push(0);
                block.extend(description.as_bytes());
                block.push(0);
                for key in keys {
                    block.write_u32::<LittleEndian>(*key).unwrap();
                }
            }
        }
    }

    let position = (base + body.len()) as u32;
    body.extend(&block);
    (position, block.len() as u32)
}

fn write_entry(block: &mut Vec<u8>, kind: u32, position: u32, size: u32) {
    for value in [kind, position, size, 0x5F00_0000] {
        block.write_u32::<LittleEndian>(value).unwrap();
    }
}

fn label(text: &str) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.resize(60, b' ');
    bytes
}

fn numeral(value: i32) -> Vec<u8> {
    let mut bytes = value.to_string().into_bytes();
    bytes.resize(32, 0);
    bytes
}

pub fn header(layout: Layout, root_position: u32, root_size: u32) -> Vec<u8> {
    let (pairs, eof) = match layout {
        Layout::Checksummed { .. } => ([[b'&', b'#'], [b'!', b'"'], [b'%', b'\'']], b'*'),
        _ => ([[b'\r', b'\n']; 3], 0x1A),
    };

    let mut data = Vec::new();
    data.extend(pairs[0]);
    data.extend(label(FILE_TYPE));
    data.extend(pairs[1]);
    data.extend(label(USER_TITLE));
    data.extend(pairs[2]);
    data.push(eof);

    match layout {
        Layout::PlainV1 => data.write_u32::<LittleEndian>(1).unwrap(),
        Layout::PlainV2 => {
            data.extend([0xCD; 7]);
            data.write_u32::<LittleEndian>(2).unwrap();
        }
        Layout::Checksummed { head, encode, tail } => {
            data.push(head);
            data.extend(numeral(encode));
            data.push(tail);
            data.push(head ^ 0x11);
            data.extend(numeral(encode ^ 0x16B4423));
            data.push(tail ^ 0x11);
            data.write_u32::<LittleEndian>(1).unwrap();
        }
    }

    data.write_u32::<LittleEndian>(root_position).unwrap();
    data.write_u32::<LittleEndian>(root_size).unwrap();

    if !matches!(layout, Layout::PlainV2) {
        // root time, next write position, time, largest key array, dir name, rez name, comment
        for value in [0, 0, 0, 0, 32, 32, 0] {
            data.write_u32::<LittleEndian>(value).unwrap();
        }
        data.push(0);
    }

    data
}
