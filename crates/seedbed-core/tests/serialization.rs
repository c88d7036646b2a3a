use seedbed_core::{ColumnSchema, DatabaseSchema, RulesConfig, SemanticType, TableSchema};

#[test]
fn serializes_schema_deterministically() {
    let schema = DatabaseSchema {
        engine: "postgres".to_string(),
        database: Some("db".to_string()),
        namespace: "public".to_string(),
        tables: vec![TableSchema {
            name: "users".to_string(),
            columns: vec![ColumnSchema {
                name: "name".to_string(),
                raw_type: "character varying(50)".to_string(),
                semantic_type: SemanticType::VarChar {
                    max_length: Some(50),
                },
                is_foreign_key: false,
                references: None,
                auto_generated: false,
            }],
            primary_key: Vec::new(),
            depends_on: Vec::new(),
        }],
    };

    let json = serde_json::to_string_pretty(&schema).expect("serialize schema");
    let expected = r#"{
  "engine": "postgres",
  "database": "db",
  "namespace": "public",
  "tables": [
    {
      "name": "users",
      "columns": [
        {
          "name": "name",
          "raw_type": "character varying(50)",
          "semantic_type": {
            "kind": "var_char",
            "max_length": 50
          },
          "is_foreign_key": false,
          "references": null,
          "auto_generated": false
        }
      ],
      "primary_key": [],
      "depends_on": []
    }
  ]
}"#;
    assert_eq!(json, expected);
}

#[test]
fn reads_rules_from_yaml() {
    let yaml = r#"
rules:
  users:
    num: 5
    columns:
      email: email
      status: "oneof[active%80, banned%20]"
  orders:
    rows: 3
"#;
    let config: RulesConfig = serde_yaml::from_str(yaml).expect("parse yaml");
    let users = config.table("users").expect("users rule");
    assert_eq!(users.num, 5);
    assert_eq!(users.columns.get("email").map(String::as_str), Some("email"));
    assert_eq!(
        users.columns.get("status").map(String::as_str),
        Some("oneof[active%80, banned%20]")
    );

    let orders = config.table("orders").expect("orders rule");
    assert_eq!(orders.num, 3);
    assert!(orders.columns.is_empty());
}

#[test]
fn reads_rules_from_toml_and_json() {
    let toml_text = r#"
[rules.products]
num = 2

[rules.products.columns]
price = "int(1,100)"
"#;
    let from_toml: RulesConfig = toml::from_str(toml_text).expect("parse toml");

    let json_text = r#"{"rules":{"products":{"num":2,"columns":{"price":"int(1,100)"}}}}"#;
    let from_json: RulesConfig = serde_json::from_str(json_text).expect("parse json");

    assert_eq!(from_toml, from_json);
}

#[test]
fn missing_sections_default_to_empty() {
    let config: RulesConfig = serde_yaml::from_str("{}").expect("parse empty");
    assert!(config.rules.is_empty());

    let config: RulesConfig = serde_yaml::from_str("rules:\n  tags: {}\n").expect("parse table");
    assert_eq!(config.table("tags").map(|rule| rule.num), Some(0));
}
