use flowga_utils::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Record {
    zeta: u32,
    alpha: Vec<u64>,
}

#[test]
fn test_jsonify_sorts_keys() {
    let record = Record {
        zeta: 1,
        alpha: vec![2, 3],
    };
    assert_eq!(jsonify(&record).unwrap(), r#"{"alpha":[2,3],"zeta":1}"#);

    let nested = json!({ "b": [{ "y": 1, "x": 2 }], "a": { "d": 0, "c": null } });
    assert_eq!(
        jsonify(&nested).unwrap(),
        r#"{"a":{"c":null,"d":0},"b":[{"x":2,"y":1}]}"#
    );
}

#[test]
fn test_dejsonify() {
    let record: Record = dejsonify(r#"{"zeta":4,"alpha":[]}"#).unwrap();
    assert_eq!(
        record,
        Record {
            zeta: 4,
            alpha: vec![]
        }
    );
    assert!(dejsonify::<Record>(r#"{"zeta":-1,"alpha":[]}"#).is_err());
}

#[test]
fn test_load_json_inline() {
    let value: Value = load_json(r#"{"population_size": 12}"#).unwrap();
    assert_eq!(value["population_size"], 12);
    assert!(load_json::<Value>("not json").is_err());
}

#[test]
fn test_load_json_file() {
    let path = std::env::temp_dir().join("flowga_utils_load_json_test.json");
    std::fs::write(&path, r#"{"zeta":9,"alpha":[1]}"#).unwrap();
    let record: Record = load_json(path.to_str().unwrap()).unwrap();
    assert_eq!(record.zeta, 9);
    std::fs::remove_file(&path).unwrap();

    assert!(read_json_input("/nonexistent/flowga/missing.json").is_err());
}
