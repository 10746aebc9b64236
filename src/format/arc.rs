//! U8 archive (.arc) reader.
//!
//! The node table is a pre-order walk of the directory tree: directory
//! nodes carry the index of the first node past their subtree, file nodes
//! carry an absolute data offset and length. Names live in a string pool
//! directly after the table.

use std::{io::Cursor, path::PathBuf, str};

use anyhow::{bail, ensure, Result};
use binrw::BinReaderExt;
use binrw_derive::binrw;

/// U8 archive magic, "U.8-".
pub const U8_MAGIC: u32 = 0x55AA382D;

const U8_NODE_SIZE: u64 = 12;

#[binrw]
#[brw(big, magic = 0x55AA382Du32)]
#[derive(Clone, Debug)]
pub struct U8Header {
    pub root_node_offset: u32,
    /// Combined size of the node table and the string pool.
    pub header_size: u32,
    pub data_offset: u32,
}

#[binrw]
#[brw(big)]
#[derive(Copy, Clone, Debug)]
struct U8Node {
    // Kind in the top byte, string pool offset in the low 24 bits.
    kind_and_name: u32,
    offset: u32,
    size: u32,
}

impl U8Node {
    #[inline]
    fn kind(&self) -> u8 { (self.kind_and_name >> 24) as u8 }

    #[inline]
    fn name_offset(&self) -> usize { (self.kind_and_name & 0xFF_FFFF) as usize }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum U8EntryKind {
    File,
    Directory,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct U8Entry {
    pub kind: U8EntryKind,
    /// Path relative to the archive root.
    pub path: PathBuf,
    /// Byte range of the file contents within the archive buffer.
    /// Zero for directories.
    pub offset: usize,
    pub size: usize,
}

/// A parsed view over a U8 archive buffer.
///
/// Parsing validates every node against the buffer, so [`U8View::file_data`]
/// cannot read out of range afterwards.
#[derive(Debug)]
pub struct U8View<'a> {
    data: &'a [u8],
    entries: Vec<U8Entry>,
}

impl<'a> U8View<'a> {
    pub fn parse(data: &'a [u8]) -> Result<U8View<'a>> {
        let mut reader = Cursor::new(data);
        let header: U8Header = reader.read_be()?;
        let len = data.len() as u64;

        let node_base = header.root_node_offset as u64;
        ensure!(node_base + U8_NODE_SIZE <= len, "node table out of range");
        reader.set_position(node_base);
        let root: U8Node = reader.read_be()?;
        ensure!(root.kind() == 1, "root node is not a directory");

        let node_count = root.size as u64;
        ensure!(node_count >= 1, "empty node table");
        ensure!(node_base + node_count * U8_NODE_SIZE <= len, "node table out of range");
        let names_base = node_base + node_count * U8_NODE_SIZE;
        let names_end = node_base + header.header_size as u64;
        ensure!(
            names_base <= names_end && names_end <= len,
            "string pool out of range"
        );
        let pool = &data[names_base as usize..names_end as usize];

        let mut entries = Vec::with_capacity(node_count as usize - 1);
        // (index of first node past the subtree, directory path)
        let mut dirs: Vec<(u64, PathBuf)> = vec![(node_count, PathBuf::new())];
        for index in 1..node_count {
            let node: U8Node = reader.read_be()?;
            while dirs.last().is_some_and(|(end, _)| index >= *end) {
                dirs.pop();
            }
            ensure!(!dirs.is_empty(), "unbalanced directory tree at node {}", index);
            let name = name_at(pool, node.name_offset())?;
            let path = dirs[dirs.len() - 1].1.join(name);
            match node.kind() {
                0 => {
                    let end = node.offset as u64 + node.size as u64;
                    ensure!(end <= len, "file data out of range for '{}'", path.display());
                    entries.push(U8Entry {
                        kind: U8EntryKind::File,
                        path,
                        offset: node.offset as usize,
                        size: node.size as usize,
                    });
                }
                1 => {
                    let end = node.size as u64;
                    ensure!(
                        end > index && end <= node_count,
                        "invalid subtree bounds for '{}'",
                        path.display()
                    );
                    entries.push(U8Entry {
                        kind: U8EntryKind::Directory,
                        path: path.clone(),
                        offset: 0,
                        size: 0,
                    });
                    dirs.push((end, path));
                }
                kind => bail!("unknown node kind {} at node {}", kind, index),
            }
        }
        Ok(U8View { data, entries })
    }

    /// Entries in node-table order, directories before their contents.
    pub fn entries(&self) -> &[U8Entry] { &self.entries }

    pub fn file_data(&self, entry: &U8Entry) -> &'a [u8] {
        &self.data[entry.offset..entry.offset + entry.size]
    }
}

fn name_at(pool: &[u8], offset: usize) -> Result<&str> {
    ensure!(offset < pool.len(), "name offset out of range");
    let bytes = &pool[offset..];
    let Some(end) = bytes.iter().position(|&b| b == 0) else {
        bail!("unterminated name in string pool");
    };
    let name = str::from_utf8(&bytes[..end])?;
    ensure!(!name.is_empty(), "empty node name");
    ensure!(
        !name.contains(['/', '\\']) && name != "." && name != "..",
        "unsafe node name '{}'",
        name
    );
    Ok(name)
}
