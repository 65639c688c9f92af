//  Copyright (c) Facebook, Inc. and its affiliates.
//  SPDX-License-Identifier: Apache-2.0

use std::fs;

use common::files::read_csv_as_keyed_nums;
use common::files::read_csv_as_strings;
use common::files::write_keyed_nums_to_csv;
use common::files::write_u64rows_to_csv;
use common::files::KeyedNums;
use tempfile::tempdir;

const KEYED_INTS: &str = "a,1,10\nb,2,20\nc,3,30\nd,4,40\n";

#[test]
fn test_read_csv_as_keyed_ints() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keyed_ints.csv");
    fs::write(&path, KEYED_INTS).unwrap();

    let r: Vec<KeyedNums<u64>> = read_csv_as_keyed_nums(&path, false).unwrap();
    assert_eq!(r.len(), 4);
    let s = r.iter().map(|x| x.key.clone()).collect::<Vec<String>>();
    assert_eq!(s, vec!["a", "b", "c", "d"]);
    assert_eq!(r[0].ints, vec![1, 10]);
    assert_eq!(r[r.len() - 1].ints, vec![4, 40]);
}

#[test]
fn test_read_csv_with_headers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("headers.csv");
    fs::write(&path, format!("id,f0,f1\n{}", KEYED_INTS)).unwrap();

    let r = read_csv_as_keyed_nums(&path, true).unwrap();
    assert_eq!(r.len(), 4);
    assert_eq!(r[1].key, "b");
}

#[test]
fn test_read_negative_as_twos_complement() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("neg.csv");
    fs::write(&path, "a,-1,2\n").unwrap();

    let r = read_csv_as_keyed_nums(&path, false).unwrap();
    assert_eq!(r[0].ints, vec![u64::MAX, 2]);
}

#[test]
fn test_read_rejects_non_numeric() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "a,x,2\n").unwrap();

    assert!(read_csv_as_keyed_nums(&path, false).is_err());
}

#[test]
fn test_read_csv_as_strings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keyed_ints.csv");
    fs::write(&path, KEYED_INTS).unwrap();

    let r: Vec<Vec<String>> = read_csv_as_strings(&path, false).unwrap();
    assert_eq!(r.len(), 4);
    assert_eq!(r[0], ["a", "1", "10"]);
}

#[test]
fn test_write_rows_then_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rows.csv");
    write_u64rows_to_csv(&[vec![1, 2, 3], vec![4, 5, 6]], &path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "1,2,3\n4,5,6\n");
}

#[test]
fn test_write_keyed_nums() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("keyed.csv");
    let rows = vec![
        KeyedNums {
            key: String::from("x"),
            ints: vec![7, 8],
        },
        KeyedNums {
            key: String::from("y"),
            ints: vec![9, 10],
        },
    ];
    write_keyed_nums_to_csv(&rows, &path).unwrap();
    assert_eq!(read_csv_as_keyed_nums(&path, false).unwrap(), rows);
}
