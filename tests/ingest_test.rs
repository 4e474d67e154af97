use std::fs;

use camino::Utf8Path;
use urbanfp::footprints::ingest::{clean_and_deduplicate, ingest_period};
use urbanfp::tables::read_updates;

fn write_updates(dir: &tempfile::TempDir, name: &str, body: &str) -> camino::Utf8PathBuf {
    let path = dir.path().join(name);
    fs::write(
        &path,
        format!("id,tile_e,tile_n,value_0,value_1,value_2,value_3\n{body}"),
    )
    .expect("write updates");
    Utf8Path::from_path(&path).expect("utf-8 path").to_owned()
}

#[test]
fn period_order_does_not_change_the_final_state() {
    let dir = tempfile::tempdir().expect("tempdir");

    // Overlapping and disjoint keys across the two periods, plus a dirty row
    // per file (negative value, duplicate key).
    let p1 = write_updates(
        &dir,
        "day-1-updates.csv",
        "alice,0,0,1.0,0.5,0.5,0.0\n\
         alice,0,0,0.5,0.75,0.25,0.0\n\
         bob,2,3,2.0,1.0,0.5,0.5\n",
    );
    let p2 = write_updates(
        &dir,
        "day-2-updates.csv",
        "alice,0,0,0.5,0.5,0.0,0.0\n\
         carol,7,7,1.0,0.0,-0.5,0.0\n\
         carol,8,8,1.0,1.0,0.0,0.0\n",
    );

    let updates_p1 = read_updates(&p1).expect("read p1");
    let updates_p2 = read_updates(&p2).expect("read p2");

    let forward = ingest_period(
        ingest_period(Vec::new(), updates_p1.clone()),
        updates_p2.clone(),
    );
    let backward = ingest_period(ingest_period(Vec::new(), updates_p2), updates_p1);

    assert_eq!(forward, backward);

    // Duplicate alice rows collapsed to per-sub-period maxima, then summed
    // across periods: max(1.0,0.5)+0.5, max(0.5,0.75)+0.5, ...
    assert_eq!(forward.len(), 3);
    assert_eq!(forward[0].user, "alice");
    assert_eq!(forward[0].values, [1.5, 1.25, 0.5, 0.0]);

    // The negative-value carol row was dropped, the clean one kept.
    let carol: Vec<_> = forward.iter().filter(|row| row.user == "carol").collect();
    assert_eq!(carol.len(), 1);
    assert_eq!(carol[0].tile, urbanfp::TileCoord::new(8, 8));
}

#[test]
fn cleaning_already_clean_updates_is_a_no_op() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_updates(
        &dir,
        "day-1-updates.csv",
        "bob,2,3,2.0,1.0,0.5,0.5\n\
         alice,0,0,1.0,0.5,0.5,0.0\n",
    );

    let once = clean_and_deduplicate(read_updates(&path).expect("read"));
    let twice = clean_and_deduplicate(once.clone());
    assert_eq!(once, twice);
}
