use tessera_cql::prelude::*;

fn error_message<T>(result: SchemaResult<T>) -> String {
    match result {
        Err(err) => err.to_string(),
        Ok(_) => panic!("expected a validation error"),
    }
}

#[test]
fn test_alter_column_type() -> SchemaResult<()> {
    let built = SchemaBuilder::alter_table("test")?
        .alter_column("name")?
        .of_type(CqlType::Ascii);
    assert_eq!(built.to_cql(), "\n\tALTER TABLE test ALTER name TYPE ascii");
    Ok(())
}

#[test]
fn test_alter_column_type_with_keyspace() -> SchemaResult<()> {
    let built = SchemaBuilder::alter_table_in("ks", "test")?
        .alter_column("name")?
        .of_type(CqlType::Ascii);
    assert_eq!(built.to_cql(), "\n\tALTER TABLE ks.test ALTER name TYPE ascii");
    Ok(())
}

#[test]
fn test_add_column() -> SchemaResult<()> {
    let built = SchemaBuilder::alter_table("test")?
        .add_column("location")?
        .of_type(CqlType::Ascii);
    assert_eq!(built.to_cql(), "\n\tALTER TABLE test ADD location ascii");
    Ok(())
}

#[test]
fn test_add_static_column() -> SchemaResult<()> {
    let built = SchemaBuilder::alter_table("test")?
        .add_static_column("stat")?
        .of_type(CqlType::Text);
    assert_eq!(built.to_cql(), "\n\tALTER TABLE test ADD stat text static");
    Ok(())
}

#[test]
fn test_add_collection_column() -> SchemaResult<()> {
    let built = SchemaBuilder::alter_table("test")?
        .add_column("scores")?
        .of_type(CqlType::map(CqlType::Text, CqlType::Int));
    assert_eq!(built.to_cql(), "\n\tALTER TABLE test ADD scores map<text, int>");
    Ok(())
}

#[test]
fn test_rename_column() -> SchemaResult<()> {
    let built = SchemaBuilder::alter_table("test")?
        .rename_column("name")?
        .to("description")?;
    assert_eq!(built.to_cql(), "\n\tALTER TABLE test RENAME name TO description");
    Ok(())
}

#[test]
fn test_drop_column() -> SchemaResult<()> {
    let built = SchemaBuilder::alter_table("test")?.drop_column("name")?;
    assert_eq!(built.to_cql(), "\n\tALTER TABLE test DROP name");
    Ok(())
}

#[test]
fn test_alter_table_options() -> SchemaResult<()> {
    let built = SchemaBuilder::alter_table("test")?
        .with_options()
        .bloom_filter_fp_chance(0.01)
        .caching(Caching::RowsOnly)
        .comment("This is a comment")
        .compaction_options(CompactionOptions::leveled_strategy().ss_table_size_in_mb(160))
        .compression_options(CompressionOptions::lz4())
        .dc_local_read_repair_chance(0.21)
        .default_time_to_live(100)
        .gc_grace_seconds(9999)
        .index_interval(512)
        .memtable_flush_period_in_millis(12)
        .populate_io_cache_on_flush(true)
        .replicate_on_write(true)
        .speculative_retry(SpeculativeRetry::always())
        .build()?;

    assert_eq!(
        built.to_cql(),
        "\n\tALTER TABLE test \
         WITH caching = 'rows_only' \
         AND bloom_filter_fp_chance = 0.01 \
         AND comment = 'This is a comment' \
         AND compression = {'sstable_compression' : 'LZ4Compressor'} \
         AND compaction = {'class' : 'LeveledCompactionStrategy', 'sstable_size_in_mb' : 160} \
         AND dclocal_read_repair_chance = 0.21 \
         AND default_time_to_live = 100 \
         AND gc_grace_seconds = 9999 \
         AND index_interval = 512 \
         AND memtable_flush_period_in_ms = 12 \
         AND populate_io_cache_on_flush = true \
         AND replicate_on_write = true \
         AND speculative_retry = 'ALWAYS'"
    );
    Ok(())
}

#[test]
fn test_build_twice_is_identical() -> SchemaResult<()> {
    let built = SchemaBuilder::alter_table("test")?
        .with_options()
        .read_repair_chance(0.1)
        .caching(Caching::All)
        .build()?;
    assert_eq!(built.to_cql(), built.to_cql());
    assert_eq!(built.to_string(), built.to_cql());
    assert_eq!(
        built.to_cql(),
        "\n\tALTER TABLE test WITH caching = 'all' AND read_repair_chance = 0.1"
    );
    Ok(())
}

#[test]
fn test_non_finite_option_rejected() -> SchemaResult<()> {
    let result = SchemaBuilder::alter_table("test")?
        .with_options()
        .dc_local_read_repair_chance(f64::INFINITY)
        .build();
    assert!(matches!(result, Err(ValidationError::InvalidSchema(_))));
    Ok(())
}

#[test]
fn test_fail_if_keyspace_name_is_reserved() {
    let result = SchemaBuilder::alter_table_in("add", "test")
        .and_then(|table| table.add_column("test"))
        .map(|column| column.of_type(CqlType::Ascii));
    assert_eq!(
        error_message(result),
        "The keyspace name 'add' is not allowed because it is a reserved keyword"
    );
}

#[test]
fn test_fail_if_table_name_is_reserved() {
    let result = SchemaBuilder::alter_table("add")
        .and_then(|table| table.add_column("test"))
        .map(|column| column.of_type(CqlType::Ascii));
    assert_eq!(
        error_message(result),
        "The table name 'add' is not allowed because it is a reserved keyword"
    );
}

#[test]
fn test_fail_if_added_column_is_reserved() {
    let result = SchemaBuilder::alter_table("test")
        .and_then(|table| table.add_column("add"))
        .map(|column| column.of_type(CqlType::Ascii));
    assert_eq!(
        error_message(result),
        "The new column name 'add' is not allowed because it is a reserved keyword"
    );
}

#[test]
fn test_fail_if_altered_column_is_reserved() {
    let result = SchemaBuilder::alter_table("test")
        .and_then(|table| table.alter_column("add"))
        .map(|column| column.of_type(CqlType::Ascii));
    assert_eq!(
        error_message(result),
        "The altered column name 'add' is not allowed because it is a reserved keyword"
    );
}

#[test]
fn test_fail_if_renamed_column_is_reserved() {
    let result = SchemaBuilder::alter_table("test").and_then(|table| table.rename_column("add"));
    assert_eq!(
        error_message(result),
        "The renamed column name 'add' is not allowed because it is a reserved keyword"
    );
}

#[test]
fn test_fail_if_new_renamed_column_is_reserved() {
    let result = SchemaBuilder::alter_table("test")
        .and_then(|table| table.rename_column("col"))
        .and_then(|rename| rename.to("add"));
    assert_eq!(
        error_message(result),
        "The new column name 'add' is not allowed because it is a reserved keyword"
    );
}

#[test]
fn test_fail_if_dropped_column_is_reserved() {
    let result = SchemaBuilder::alter_table("test").and_then(|table| table.drop_column("add"));
    assert_eq!(
        error_message(result),
        "The dropped column name 'add' is not allowed because it is a reserved keyword"
    );
}
