#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One member of a fixture archive.
pub enum Member<'a> {
    Dir(&'a str),
    Stored(&'a str, &'a [u8]),
    Deflated(&'a str, &'a [u8]),
}

pub fn write_zip(path: &Path, members: &[Member<'_>]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    for member in members {
        match member {
            Member::Dir(name) => {
                writer.add_directory(*name, FileOptions::default()).unwrap();
            }
            Member::Stored(name, data) => {
                let options = FileOptions::default().compression_method(CompressionMethod::Stored);
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
            Member::Deflated(name, data) => {
                let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
                writer.start_file(*name, options).unwrap();
                writer.write_all(data).unwrap();
            }
        }
    }
    writer.finish().unwrap();
}

pub fn write_file(path: &Path, data: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, data).unwrap();
}

/// Contents of `summary.txt` in the reports fixture.
pub const SUMMARY: &[u8] = b"Q1 revenue!\n";

/// `reports/q1.zip` holding `summary.txt`, `charts/` and a 900 byte
/// `charts/fig1.png`, plus a hidden `.cache` and a plain `notes.txt` beside it.
pub fn reports_tree(base: &Path) {
    let figure: Vec<u8> = (0..900u32).map(|i| (i % 251) as u8).collect();
    write_zip(
        &base.join("reports/q1.zip"),
        &[
            Member::Stored("summary.txt", SUMMARY),
            Member::Dir("charts/"),
            Member::Deflated("charts/fig1.png", &figure),
        ],
    );
    write_file(&base.join("reports/notes.txt"), b"see q1.zip");
    write_file(&base.join("reports/.cache"), b"hidden");
}

/// `lib.zip` written without directory records for its nested members.
pub fn library_zip(base: &Path) {
    let source = b"package main\n\nfunc main() {}\n".repeat(40);
    write_zip(
        &base.join("lib.zip"),
        &[
            Member::Deflated("src/main.go", &source),
            Member::Stored("src/util/empty.go", b""),
            Member::Stored("README.md", b"# lib\n"),
            Member::Stored(".gitignore", b"target\n"),
            Member::Stored("docs.zip", b"not really an archive"),
        ],
    );
}
