mod common;

use pretty_assertions::assert_eq;
use tracing_test::traced_test;
use wdb2::error::{Error, Result};
use wdb2::{Db2File, FieldValue, Format, LoadOptions, Locale};

use common::{Db2Builder, Value};

fn keyed_file() -> Result<Db2File> {
    let input = Db2Builder::new()
        .row(vec![Value::Int(3), Value::Str("three".into()), Value::Float(3.0)])
        .row(vec![Value::Int(1), Value::Str("one".into()), Value::Float(1.0)])
        .row(vec![Value::Int(1), Value::Str("uno".into()), Value::Float(1.5)])
        .row(vec![Value::Int(7), Value::Str("seven".into()), Value::Float(7.0)])
        .to_bytes();

    Db2File::from_bytes(input, "nsf")
}

#[traced_test]
#[test]
fn keyed_index_leaves_gaps() -> Result<()> {
    let file = keyed_file()?;
    let (table, index) = file.materialize(&"nsf".parse()?)?;

    assert_eq!(index.len(), 8);
    for empty in [0, 2, 4, 5, 6] {
        assert_eq!(index.get(empty), None, "slot {empty} should be empty");
    }
    assert_eq!(index.get(1), Some(2));
    assert_eq!(index.get(3), Some(0));
    assert_eq!(index.get(7), Some(3));

    assert_eq!(table.len(), 4);
    assert_eq!(table.lookup(&index, 1).unwrap().get_f32(2)?, 1.5);
    assert_eq!(table.lookup(&index, 7).unwrap().get_u32(0)?, 7);
    assert!(table.lookup(&index, 4).is_none());
    assert!(table.lookup(&index, 80).is_none());

    Ok(())
}

#[traced_test]
#[test]
fn sequential_index_preserves_file_order() -> Result<()> {
    let input = (0..6u32)
        .map(|i| vec![Value::Int(60 - i * 10), Value::Byte(i as u8)])
        .fold(Db2Builder::new(), |builder, row| builder.row(row))
        .to_bytes();

    let file = Db2File::from_bytes(input, "ib")?;
    let (table, index) = file.materialize(&"ib".parse()?)?;

    assert!(!index.is_keyed());
    assert_eq!(index.len(), 6);
    for (i, record) in file.records().enumerate() {
        let row = table.row(index.get(i).unwrap())?;
        assert_eq!(row.get_u32(0)?, record.get_u32(0)?);
        assert_eq!(row.get_u8(1)?, i as u8);
    }

    Ok(())
}

#[traced_test]
#[test]
fn consumer_format_can_drop_fields() -> Result<()> {
    let file = keyed_file()?;
    let (table, index) = file.materialize(&"dxf".parse()?)?;

    assert_eq!(table.row_size(), 4);
    assert_eq!(index.len(), 8);
    assert_eq!(table.lookup(&index, 3).unwrap().get_f32(2)?, 3.0);
    assert_eq!(table.as_bytes().len(), 16);

    Ok(())
}

#[traced_test]
#[test]
fn materialize_rejects_wrong_length() -> Result<()> {
    let file = keyed_file()?;

    let result = file.materialize(&"nsfi".parse()?);
    assert!(matches!(
        result,
        Err(Error::FormatMismatch {
            expected: 3,
            actual: 4
        })
    ));

    Ok(())
}

#[traced_test]
#[test]
fn empty_file_materializes_empty_table() -> Result<()> {
    let mut input = Db2Builder::new().to_bytes();
    // An empty builder reports zero fields; give the header two.
    input[8] = 2;

    let file = Db2File::from_bytes(input, "ni")?;
    assert!(file.is_empty());

    let (table, index) = file.materialize(&"ni".parse()?)?;
    assert!(table.is_empty());
    assert_eq!(index.len(), 1);
    assert_eq!(index.get(0), None);

    Ok(())
}

#[traced_test]
#[test]
fn strings_resolve_per_locale() -> Result<()> {
    let english = keyed_file()?;
    let german = Db2File::from_bytes(
        Db2Builder::new()
            .row(vec![Value::Int(3), Value::Str("drei".into()), Value::Float(3.0)])
            .row(vec![Value::Int(1), Value::Str("eins".into()), Value::Float(1.0)])
            .row(vec![Value::Int(1), Value::Str("ein".into()), Value::Float(1.5)])
            .row(vec![Value::Int(7), Value::Str("sieben".into()), Value::Float(7.0)])
            .locale(1 << Locale::deDE.slot())
            .to_bytes(),
        "nsf",
    )?;

    let format: Format = "nsf".parse()?;
    let (mut table, index) = english.materialize(&format)?;

    let row = table.lookup(&index, 7).unwrap();
    assert_eq!(row.get_string(1)?.offset(Locale::enUS), None);

    let en = english.resolve_strings(&format, &mut table, Locale::enUS)?;
    let de = german.resolve_strings(&format, &mut table, Locale::deDE)?;

    assert_eq!(en.as_slice(), english.string_pool());
    assert_eq!(de.as_slice(), german.string_pool());

    for (record, row) in english.records().zip(table.rows()) {
        let slot = row.get_string(1)?;
        assert_eq!(slot.offset(Locale::enUS), Some(record.get_string_offset(1)?));
        assert_eq!(en.get_str(slot.offset(Locale::enUS).unwrap())?, record.get_str(1)?);
        assert_eq!(slot.offset(Locale::frFR), None);
    }

    let seven = table.lookup(&index, 7).unwrap();
    assert_eq!(seven.get_str(1, &en)?, Some("seven"));
    assert_eq!(seven.get_str(1, &de)?, Some("sieben"));

    let one = table.lookup(&index, 1).unwrap();
    assert_eq!(one.get_str(1, &en)?, Some("uno"));
    assert_eq!(one.get_str(1, &de)?, Some("ein"));

    Ok(())
}

#[traced_test]
#[test]
fn resolving_again_keeps_other_locales() -> Result<()> {
    let file = keyed_file()?;
    let format: Format = "nsf".parse()?;
    let (mut table, index) = file.materialize(&format)?;

    let en = file.resolve_strings(&format, &mut table, Locale::enUS)?;
    let fr = file.resolve_strings(&format, &mut table, Locale::frFR)?;
    let en_again = file.resolve_strings(&format, &mut table, Locale::enUS)?;

    let three = table.lookup(&index, 3).unwrap();
    assert_eq!(three.get_str(1, &en)?, Some("three"));
    assert_eq!(three.get_str(1, &fr)?, Some("three"));
    assert_eq!(en, en_again);

    Ok(())
}

#[traced_test]
#[test]
fn resolve_rejects_table_from_other_shape() -> Result<()> {
    let file = keyed_file()?;
    let format: Format = "nsf".parse()?;
    let (mut table, _) = file.materialize(&format)?;

    let shorter = Db2File::from_bytes(
        Db2Builder::new()
            .row(vec![Value::Int(1), Value::Str("solo".into()), Value::Float(0.0)])
            .to_bytes(),
        "nsf",
    )?;

    let result = shorter.resolve_strings(&format, &mut table, Locale::esES);
    assert!(matches!(
        result,
        Err(Error::TableMismatch {
            expected: 1,
            actual: 4
        })
    ));

    let row = table.row(0)?;
    assert_eq!(row.get_string(1)?.offset(Locale::esES), None);

    Ok(())
}

#[traced_test]
#[test]
fn resolve_fails_on_string_past_pool() -> Result<()> {
    let mut input = Db2Builder::new()
        .row(vec![Value::Int(1), Value::Str("a".into())])
        .row(vec![Value::Int(2), Value::Str("b".into())])
        .to_bytes();
    // Point the second record's string at the end of the pool.
    let second_string = 32 + 8 + 4;
    input[second_string] = 0x40;

    let file = Db2File::from_bytes(input, "ns")?;
    let format: Format = "ns".parse()?;
    let (mut table, _) = file.materialize(&format)?;

    let result = file.resolve_strings(&format, &mut table, Locale::enUS);
    assert!(matches!(result, Err(Error::OutOfBounds(_))));

    assert_eq!(table.row(0)?.get_string(1)?.offset(Locale::enUS), None);

    Ok(())
}

#[traced_test]
#[test]
fn row_values_follow_format() -> Result<()> {
    let file = keyed_file()?;
    let format: Format = "nsf".parse()?;
    let (mut table, index) = file.materialize(&format)?;
    let pool = file.resolve_strings(&format, &mut table, Locale::enUS)?;

    let values = table.lookup(&index, 3).unwrap().values(Some(&pool))?;
    assert_eq!(
        values,
        vec![
            (0, FieldValue::UInt(3)),
            (1, FieldValue::String(Some("three"))),
            (2, FieldValue::Float(3.0)),
        ]
    );

    let unresolved = table.row(0)?.values(None)?;
    assert_eq!(unresolved[1], (1, FieldValue::String(None)));

    Ok(())
}

#[traced_test]
#[test]
fn huge_key_exceeds_slot_limit() -> Result<()> {
    let input = Db2Builder::new()
        .row(vec![Value::Int(5_000), Value::Byte(1)])
        .to_bytes();
    let options = LoadOptions::builder().max_index_slots(1_000).build();

    let file = Db2File::from_bytes_with_options(input.clone(), "nb", options)?;
    let result = file.materialize(&"nb".parse()?);
    assert!(matches!(
        result,
        Err(Error::IndexTooLarge {
            slots: 5_001,
            limit: 1_000
        })
    ));

    let file = Db2File::from_bytes_with_options(
        input,
        "nb",
        LoadOptions::builder().max_index_slots(5_001).build(),
    )?;
    let (table, index) = file.materialize(&"nb".parse()?)?;
    assert_eq!(index.len(), 5_001);
    assert_eq!(table.lookup(&index, 5_000).unwrap().get_u8(1)?, 1);

    Ok(())
}

#[traced_test]
#[test]
fn huge_record_count_exceeds_slot_limit() -> Result<()> {
    let mut input = Db2Builder::new().to_bytes();
    // Four billion zero sized records in a header only file.
    input[4..8].copy_from_slice(&u32::MAX.to_le_bytes());
    input[8] = 1;

    let options = LoadOptions::builder().max_index_slots(16).build();
    let file = Db2File::from_bytes_with_options(input, "X", options)?;
    assert_eq!(file.len(), u32::MAX as usize);

    let result = file.materialize(&"X".parse()?);
    assert!(matches!(result, Err(Error::IndexTooLarge { limit: 16, .. })));

    Ok(())
}
