use planner::{SchemaPropertyMapper, query::mapping::schema::FeatureTypeMapping};

pub const BUILDING: &str = r#"{
    "table": "building",
    "properties": [
        { "path": "A", "column": "a", "data_type": "int" },
        { "path": "B", "column": "b", "data_type": "int" },
        { "path": "app:name", "column": "name", "data_type": "varchar(120)" },
        { "path": "app:age", "column": "age", "data_type": "integer" },
        { "path": "app:price", "column": "price", "data_type": "numeric(10, 2)" },
        { "path": "app:built", "column": "built", "data_type": "date" },
        { "path": "app:updated", "column": "updated", "data_type": "timestamptz" },
        { "path": "app:geom", "column": "geom", "data_type": "geometry", "srid": 4326 },
        {
            "path": "app:owner/app:name",
            "column": "name",
            "data_type": "text",
            "joins": [{ "table": "person", "from_column": "owner_id", "to_column": "id" }]
        },
        {
            "path": "app:owner/app:address/app:city",
            "column": "city",
            "data_type": "text",
            "joins": [
                { "table": "person", "from_column": "owner_id", "to_column": "id" },
                { "table": "address", "from_column": "address_id", "to_column": "id" }
            ]
        }
    ]
}"#;

pub fn mapper() -> SchemaPropertyMapper {
    let mapping = FeatureTypeMapping::from_json(BUILDING).expect("fixture mapping parses");
    SchemaPropertyMapper::new(mapping).expect("fixture mapping is valid")
}
