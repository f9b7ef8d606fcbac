#![allow(dead_code)]

use std::io::{Cursor, Write};

use binrw::BinWrite;
use byteorder::{LittleEndian, WriteBytesExt};
use wdb2::header::{Db2Header, ExtendedHeader};

pub const LEGACY_BUILD: u32 = 12340;
pub const EXTENDED_BUILD: u32 = 15595;

/// A single field value written into a synthetic record
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float(f32),
    Int(u32),
    Byte(u8),
    Str(String),
}

/// Builds WDB2 files in memory for tests
#[derive(Debug, Clone)]
pub struct Db2Builder {
    build: u32,
    table_hash: u32,
    index_range: Option<(u32, u32)>,
    locale: u32,
    rows: Vec<Vec<Value>>,
}

impl Db2Builder {
    pub fn new() -> Self {
        Db2Builder {
            build: LEGACY_BUILD,
            table_hash: 0x1234_5678,
            index_range: None,
            locale: 0,
            rows: Vec::new(),
        }
    }

    pub fn build(mut self, build: u32) -> Self {
        self.build = build;
        self
    }

    pub fn index_range(mut self, min: u32, max: u32) -> Self {
        self.build = EXTENDED_BUILD;
        self.index_range = Some((min, max));
        self
    }

    pub fn locale(mut self, locale: u32) -> Self {
        self.locale = locale;
        self
    }

    pub fn row(mut self, values: Vec<Value>) -> Self {
        self.rows.push(values);
        self
    }

    /// Serialize records and strings, returning `(records, record_size, strings)`.
    fn payload(&self) -> (Vec<u8>, u32, Vec<u8>) {
        let mut strings = vec![0u8];
        let mut records = Vec::new();
        let mut record_size = 0;

        for row in &self.rows {
            let start = records.len();
            for value in row {
                match value {
                    Value::Float(v) => records.write_f32::<LittleEndian>(*v).unwrap(),
                    Value::Int(v) => records.write_u32::<LittleEndian>(*v).unwrap(),
                    Value::Byte(v) => records.write_u8(*v).unwrap(),
                    Value::Str(v) if v.is_empty() => records.write_u32::<LittleEndian>(0).unwrap(),
                    Value::Str(v) => {
                        records
                            .write_u32::<LittleEndian>(strings.len() as u32)
                            .unwrap();
                        strings.extend_from_slice(v.as_bytes());
                        strings.push(0);
                    }
                }
            }
            record_size = (records.len() - start) as u32;
        }

        (records, record_size, strings)
    }

    pub fn header(&self) -> Db2Header {
        let (_, record_size, strings) = self.payload();
        let (min_index, max_index) = self.index_range.unwrap_or_default();

        Db2Header {
            record_count: self.rows.len() as u32,
            field_count: self.rows.first().map_or(0, |r| r.len() as u32),
            record_size,
            string_size: strings.len() as u32,
            table_hash: self.table_hash,
            build: self.build,
            unknown: 0,
            extended: (self.build > wdb2::header::LEGACY_BUILD_THRESHOLD).then_some(
                ExtendedHeader {
                    min_index,
                    max_index,
                    locale: self.locale,
                    unknown: 0,
                },
            ),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let header = self.header();
        let (records, _, strings) = self.payload();

        let mut output = Cursor::new(Vec::new());
        header.write(&mut output).unwrap();

        let legacy = header.legacy_block_size().unwrap();
        output.write_all(&vec![0xCD; legacy]).unwrap();
        output.write_all(&records).unwrap();
        output.write_all(&strings).unwrap();

        output.into_inner()
    }
}

/// The pool offset the builder assigns to each string value, in write order.
pub fn string_offsets(rows: &[Vec<Value>]) -> Vec<u32> {
    let mut next = 1u32;
    let mut offsets = Vec::new();
    for value in rows.iter().flatten() {
        if let Value::Str(s) = value {
            if s.is_empty() {
                offsets.push(0);
            } else {
                offsets.push(next);
                next += s.len() as u32 + 1;
            }
        }
    }
    offsets
}
