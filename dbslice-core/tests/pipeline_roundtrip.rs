/*!
End-to-end tests for the export/import pipeline.

These drive the real filesystem path: dump text is split and compressed the
way the export side does it, then rediscovered, regrouped and reconstructed
the way the import side does it.
*/

use dbslice_core::{
    group_artifacts, merge_group, split_by_lines, ArtifactCodec, GzipCodec, SplitOutcome,
    TempFileSet,
};
use std::fs;
use tempfile::TempDir;

fn synthetic_dump(rows: usize) -> String {
    let mut dump = String::from("-- dump header\nDROP DATABASE IF EXISTS shop;\nCREATE DATABASE shop;\n\n");
    for i in 0..rows {
        dump.push_str(&format!(
            "INSERT INTO shop.orders VALUES ({i}, 'customer-{i}', 'pending', '2024-01-01');\n"
        ));
        if i % 25 == 0 {
            dump.push('\n');
        }
    }
    dump
}

#[test]
fn test_split_compress_merge_round_trip() {
    let dir = TempDir::new().unwrap();
    let dump = synthetic_dump(200);

    // Phase 1: the export side writes the raw dump and splits it.
    let raw = dir.path().join("shop.sql");
    fs::write(&raw, &dump).unwrap();

    let parts = match split_by_lines(&raw, 1024).unwrap() {
        SplitOutcome::Parts(parts) => parts,
        SplitOutcome::Whole(_) => panic!("expected the dump to split"),
    };
    assert!(parts.len() > 2);
    fs::remove_file(&raw).unwrap();

    // Phase 2: every part is compressed; the uncompressed forms disappear.
    let codec = GzipCodec::new();
    let mut compressed_names = Vec::new();
    for part in &parts {
        let compressed = codec.compress_path(part).unwrap();
        assert!(!part.exists());
        compressed_names.push(
            compressed
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned(),
        );
    }

    // Phase 3: transport scrambles discovery order; grouping restores it.
    compressed_names.reverse();
    let grouped = group_artifacts(compressed_names);
    assert!(grouped.singles.is_empty());
    assert_eq!(grouped.groups.len(), 1);
    let (base, group) = grouped.groups.iter().next().unwrap();
    assert_eq!(base, "shop.sql");
    assert_eq!(group.len(), parts.len());

    // Phase 4: the import side reconstructs the dump byte-exact.
    let mut temps = TempFileSet::new();
    let merged = merge_group(dir.path(), base, group, &codec, &mut temps).unwrap();
    assert_eq!(fs::read_to_string(&merged).unwrap(), dump);

    // Phase 5: releasing the temp set leaves only the durable artifacts.
    temps.release();
    for entry in fs::read_dir(dir.path()).unwrap() {
        let name = entry.unwrap().file_name().to_string_lossy().into_owned();
        assert!(name.ends_with(".gz"), "unexpected leftover {name}");
    }
}

#[test]
fn test_small_dump_round_trips_without_parts() {
    let dir = TempDir::new().unwrap();
    let dump = "DROP DATABASE IF EXISTS tiny;\nCREATE DATABASE tiny;\n";

    let raw = dir.path().join("tiny.sql");
    fs::write(&raw, dump).unwrap();

    // Below the threshold the artifact keeps its base name untouched.
    let outcome = split_by_lines(&raw, 1024 * 1024).unwrap();
    assert_eq!(outcome, SplitOutcome::Whole(raw.clone()));

    let codec = GzipCodec::new();
    let compressed = codec.compress_path(&raw).unwrap();
    assert_eq!(compressed, dir.path().join("tiny.sql.gz"));

    // Import treats it as a single: plain decompression, no merging.
    let grouped = group_artifacts(["tiny.sql.gz".to_string()]);
    assert_eq!(grouped.singles, vec!["tiny.sql.gz"]);
    assert!(grouped.groups.is_empty());

    let restored = codec.decompress_path(&compressed).unwrap();
    assert_eq!(fs::read_to_string(&restored).unwrap(), dump);
}

#[test]
fn test_threshold_variations_preserve_content() {
    let dir = TempDir::new().unwrap();
    let dump = synthetic_dump(60);
    let codec = GzipCodec::new();

    for threshold in [32_u64, 100, 512, 4096] {
        let raw = dir.path().join("shop.sql");
        fs::write(&raw, &dump).unwrap();

        let parts = match split_by_lines(&raw, threshold).unwrap() {
            SplitOutcome::Parts(parts) => parts,
            SplitOutcome::Whole(_) => panic!("threshold {threshold} should split"),
        };
        fs::remove_file(&raw).unwrap();

        let names: Vec<String> = parts
            .iter()
            .map(|p| {
                codec
                    .compress_path(p)
                    .unwrap()
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();

        let grouped = group_artifacts(names);
        let mut temps = TempFileSet::new();
        let merged =
            merge_group(dir.path(), "shop.sql", &grouped.groups["shop.sql"], &codec, &mut temps)
                .unwrap();
        assert_eq!(
            fs::read_to_string(&merged).unwrap(),
            dump,
            "content diverged at threshold {threshold}"
        );

        temps.release();
        for name in &grouped.groups["shop.sql"] {
            fs::remove_file(dir.path().join(name)).unwrap();
        }
    }
}
