use locker_migrate::{
    parse_dump,
    sql::{Literal, split_literals, split_tuples},
};
use proptest::prelude::*;
use serde_json::{Value, json};

#[derive(Debug, Clone)]
enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl Cell {
    fn sql(&self) -> String {
        match self {
            Cell::Int(n) => n.to_string(),
            // Debug output is the shortest text that parses back exactly
            Cell::Float(f) => format!("{f:?}"),
            Cell::Text(s) => format!("'{s}'"),
            Cell::Bool(b) => b.to_string(),
            Cell::Null => "NULL".to_string(),
        }
    }

    fn json(&self) -> Value {
        match self {
            Cell::Int(n) => json!(n),
            Cell::Float(f) => json!(f),
            Cell::Text(s) => json!(s),
            Cell::Bool(b) => json!(b),
            Cell::Null => Value::Null,
        }
    }
}

fn cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        any::<i64>().prop_map(Cell::Int),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Cell::Float),
        "[a-zA-Z0-9 ,;()]*".prop_map(Cell::Text),
        any::<bool>().prop_map(Cell::Bool),
        Just(Cell::Null),
    ]
}

fn rows() -> impl Strategy<Value = Vec<Vec<Cell>>> {
    (1usize..5).prop_flat_map(|width| {
        prop::collection::vec(prop::collection::vec(cell(), width), 1..6)
    })
}

proptest! {
    #[test]
    fn generated_inserts_parse_back(rows in rows()) {
        let width = rows[0].len();
        let columns = (0..width).map(|i| format!("c{i}")).collect::<Vec<_>>();
        let tuples = rows
            .iter()
            .map(|row| format!("({})", row.iter().map(Cell::sql).collect::<Vec<_>>().join(", ")))
            .collect::<Vec<_>>()
            .join(",\n  ");
        let dump = format!("INSERT INTO \"gen\" ({}) VALUES {tuples};\n", columns.join(", "));

        let tables = parse_dump(&dump).unwrap();
        let parsed = tables.rows("gen").unwrap();
        prop_assert_eq!(parsed.len(), rows.len());
        for (parsed_row, row) in parsed.iter().zip(&rows) {
            for (column, cell) in columns.iter().zip(row) {
                prop_assert_eq!(&parsed_row[column], &cell.json());
            }
        }
    }

    #[test]
    fn integers_evaluate_exactly(n in any::<i64>()) {
        prop_assert_eq!(Literal::evaluate(&n.to_string()).unwrap(), Literal::Integer(n));
    }

    #[test]
    fn floats_stay_numeric_and_exact(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        let tables = parse_dump(&format!("INSERT INTO t (x) VALUES ({f:?});")).unwrap();
        let parsed = &tables.rows("t").unwrap()[0]["x"];
        prop_assert!(parsed.is_number());
        prop_assert_eq!(parsed.as_f64(), Some(f));
    }

    #[test]
    fn quoted_text_survives_tuple_and_literal_splitting(text in "[a-zA-Z0-9 ,;()]*") {
        let values = format!("(1, '{text}')");
        let tuples = split_tuples(&values).unwrap();
        prop_assert_eq!(tuples.len(), 1);
        let literals = split_literals(tuples[0]);
        prop_assert_eq!(literals.len(), 2);
        prop_assert_eq!(Literal::evaluate(literals[1]).unwrap(), Literal::String(text));
    }
}

#[test]
fn string_boundary_holds_separators() {
    let tuples = split_tuples("('a,b);c')").unwrap();
    assert_eq!(tuples, vec!["'a,b);c'"]);
    assert_eq!(split_literals(tuples[0]), vec!["'a,b);c'"]);
}
