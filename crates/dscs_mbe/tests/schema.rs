use std::path::{Path, PathBuf};

use dscs_mbe::error::Result;
use dscs_mbe::{
    decode, encode, export_csv, import_csv_with, EntryType, EntryValue, Expa32, Expa64,
    SchemaOverlay, Structure, StructureEntry, Table, TableFile,
};
use pretty_assertions::assert_eq;

fn fixture_overlay() -> SchemaOverlay {
    SchemaOverlay::new(format!(
        "{}/tests/fixtures/structures",
        env!("CARGO_MANIFEST_DIR")
    ))
}

fn types_of(structure: &Structure) -> Vec<EntryType> {
    structure.entries().iter().map(|e| e.ty).collect()
}

fn names_of(structure: &Structure) -> Vec<&str> {
    structure.entries().iter().map(|e| e.name.as_str()).collect()
}

#[test]
fn resolve_by_exact_table_name() -> Result<()> {
    let entries = fixture_overlay().resolve(Path::new("data/monster_para.mbe"), "monster_para")?;

    let structure = Structure::new(entries);
    assert_eq!(names_of(&structure), vec!["id", "name", "hp", "flags"]);
    assert_eq!(
        types_of(&structure),
        vec![
            EntryType::Int32,
            EntryType::String,
            EntryType::Int16,
            EntryType::IntArray,
        ]
    );
    Ok(())
}

#[test]
fn resolve_by_table_name_pattern() -> Result<()> {
    let entries = fixture_overlay().resolve(Path::new("data/monster_para.mbe"), "skill_counter")?;

    let structure = Structure::new(entries);
    assert_eq!(names_of(&structure), vec!["skill_id", "power"]);
    Ok(())
}

#[test]
fn table_name_pattern_must_match_the_whole_name() -> Result<()> {
    // "skill_.*" may not match a mere substring of the table name
    let entries = fixture_overlay().resolve(
        Path::new("data/monster_para.mbe"),
        "base_skill_counter_extra",
    )?;
    assert!(entries.is_empty());
    Ok(())
}

#[test]
fn first_matching_path_pattern_wins() -> Result<()> {
    // both "monster" and "mon" match the path; the earlier key selects
    // monster.json, not the decoy
    let entries = fixture_overlay().resolve(Path::new("xx/monster_para.mbe"), "monster_para")?;
    assert_eq!(Structure::new(entries).len(), 4);
    Ok(())
}

#[test]
fn unmatched_path_resolves_empty() -> Result<()> {
    let entries = fixture_overlay().resolve(Path::new("data/field_para.mbe"), "monster_para")?;
    assert!(entries.is_empty());
    Ok(())
}

#[test]
fn missing_overlay_root_resolves_empty() -> Result<()> {
    let overlay = SchemaOverlay::new("no/such/root");
    let entries = overlay.resolve(Path::new("data/monster_para.mbe"), "monster_para")?;
    assert!(entries.is_empty());
    Ok(())
}

#[test]
fn expa64_prefers_a_matching_overlay_for_names() -> Result<()> {
    let structure = Structure::new(vec![
        StructureEntry::new("a".into(), EntryType::Int32),
        StructureEntry::new("b".into(), EntryType::String),
    ]);
    let table = Table::new(
        "merge_table".into(),
        structure,
        vec![vec![EntryValue::Int32(1), EntryValue::String("x".into())]],
    );
    let image = encode::<Expa64>(&TableFile::new(vec![table]))?;

    let file = decode::<Expa64>(&image, Path::new("data/monster_merge.mbe"), &fixture_overlay())?;
    assert_eq!(names_of(&file.tables[0].structure), vec!["id", "name"]);
    Ok(())
}

#[test]
fn expa64_falls_back_to_embedded_types_on_mismatch() -> Result<()> {
    // same column count as the overlay's merge_table, but int16 != int32
    let structure = Structure::new(vec![
        StructureEntry::new("a".into(), EntryType::Int16),
        StructureEntry::new("b".into(), EntryType::String),
    ]);
    let table = Table::new(
        "merge_table".into(),
        structure,
        vec![vec![EntryValue::Int16(1), EntryValue::String("x".into())]],
    );
    let image = encode::<Expa64>(&TableFile::new(vec![table]))?;

    let file = decode::<Expa64>(&image, Path::new("data/monster_merge.mbe"), &fixture_overlay())?;
    assert_eq!(names_of(&file.tables[0].structure), vec!["int16 0", "string 1"]);
    assert_eq!(
        types_of(&file.tables[0].structure),
        vec![EntryType::Int16, EntryType::String]
    );
    Ok(())
}

#[test]
fn expa32_round_trips_through_the_overlay() -> Result<()> {
    let structure = Structure::new(vec![
        StructureEntry::new("id".into(), EntryType::Int32),
        StructureEntry::new("name".into(), EntryType::String),
        StructureEntry::new("hp".into(), EntryType::Int16),
        StructureEntry::new("flags".into(), EntryType::IntArray),
    ]);
    let rows = vec![
        vec![
            EntryValue::Int32(1),
            EntryValue::String("Agumon".into()),
            EntryValue::Int16(950),
            EntryValue::IntArray(vec![1, 2, 3]),
        ],
        vec![
            EntryValue::Int32(2),
            EntryValue::String(String::new()),
            EntryValue::Int16(-40),
            EntryValue::IntArray(Vec::new()),
        ],
    ];
    let file = TableFile::new(vec![Table::new("monster_para".into(), structure, rows)]);

    let image = encode::<Expa32>(&file)?;
    let decoded = decode::<Expa32>(&image, Path::new("data/monster_para.mbe"), &fixture_overlay())?;

    assert_eq!(decoded, file);
    Ok(())
}

#[test]
fn csv_round_trips_through_the_overlay() -> Result<()> {
    let structure = Structure::new(vec![
        StructureEntry::new("id".into(), EntryType::Int32),
        StructureEntry::new("name".into(), EntryType::String),
        StructureEntry::new("hp".into(), EntryType::Int16),
        StructureEntry::new("flags".into(), EntryType::IntArray),
    ]);
    let rows = vec![
        vec![
            EntryValue::Int32(1),
            EntryValue::String("Agu, \"the\" mon".into()),
            EntryValue::Int16(950),
            EntryValue::IntArray(vec![-1, 0, 7]),
        ],
        vec![
            EntryValue::Int32(2),
            EntryValue::String(String::new()),
            EntryValue::Int16(0),
            EntryValue::IntArray(Vec::new()),
        ],
    ];
    let file = TableFile::new(vec![Table::new("monster_para".into(), structure, rows)]);

    // the directory name is what structure.json patterns match against
    let target: PathBuf = std::env::temp_dir().join(format!("dscs_mbe_csv_{}", std::process::id()));
    export_csv(&file, &target)?;
    let imported = import_csv_with(&target, &fixture_overlay());
    let _ = std::fs::remove_dir_all(&target);

    assert_eq!(imported?, file);
    Ok(())
}
