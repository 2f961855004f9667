use proptest::prelude::*;
use tessera_cql::prelude::*;
use tessera_cql::schema::{OptionKey, TableOption, TableOptions, TimestampResolution};

#[test]
fn test_create_keyspace_simple_strategy() -> SchemaResult<()> {
    let built = SchemaBuilder::create_keyspace("tessera")?
        .if_not_exists()
        .with_simple_strategy(3)
        .durable_writes(true)
        .build()?;
    assert_eq!(
        built.to_cql(),
        "\n\tCREATE KEYSPACE IF NOT EXISTS tessera WITH replication = \
         {'class' : 'SimpleStrategy', 'replication_factor' : 3} AND durable_writes = true"
    );
    Ok(())
}

#[test]
fn test_create_keyspace_requires_replication() -> SchemaResult<()> {
    let err = SchemaBuilder::create_keyspace("tessera")?
        .durable_writes(false)
        .build()
        .unwrap_err();
    assert!(matches!(err, ValidationError::InvalidSchema(_)));
    Ok(())
}

#[test]
fn test_alter_keyspace_durable_writes_only() -> SchemaResult<()> {
    let built = SchemaBuilder::alter_keyspace("tessera")?
        .durable_writes(false)
        .build()?;
    assert_eq!(
        built.to_cql(),
        "\n\tALTER KEYSPACE tessera WITH durable_writes = false"
    );
    Ok(())
}

#[test]
fn test_alter_keyspace_without_changes_is_rejected() -> SchemaResult<()> {
    let result = SchemaBuilder::alter_keyspace("tessera")?.build();
    assert!(matches!(result, Err(ValidationError::InvalidSchema(_))));
    Ok(())
}

#[test]
fn test_drop_keyspace() -> SchemaResult<()> {
    assert_eq!(
        SchemaBuilder::drop_keyspace("tessera")?.build().to_cql(),
        "\n\tDROP KEYSPACE tessera"
    );
    assert_eq!(
        SchemaBuilder::drop_keyspace("tessera")?
            .if_exists()
            .build()
            .to_cql(),
        "\n\tDROP KEYSPACE IF EXISTS tessera"
    );
    Ok(())
}

#[test]
fn test_create_table_with_clustering_order_and_options() -> SchemaResult<()> {
    let built = SchemaBuilder::create_table_in("ks", "events")?
        .if_not_exists()
        .add_partition_key("id", CqlType::Bigint)?
        .add_clustering_column("day", CqlType::Text)?
        .add_clustering_column("seq", CqlType::Int)?
        .add_static_column("owner", CqlType::Text)?
        .add_column("payload", CqlType::Blob)?
        .with_options()
        .clustering_order("seq", ClusteringOrder::Desc)?
        .comment("Events per day")
        .gc_grace_seconds(3600)
        .build()?;

    assert_eq!(
        built.to_cql(),
        "\n\tCREATE TABLE IF NOT EXISTS ks.events(\
         \n\t\tid bigint,\
         \n\t\tday text,\
         \n\t\tseq int,\
         \n\t\towner text static,\
         \n\t\tpayload blob,\
         \n\t\tPRIMARY KEY(id, day, seq)) \
         WITH CLUSTERING ORDER BY(seq DESC) \
         AND comment = 'Events per day' \
         AND gc_grace_seconds = 3600"
    );
    Ok(())
}

#[test]
fn test_create_table_without_options() -> SchemaResult<()> {
    let built = SchemaBuilder::create_table("users")?
        .add_partition_key("login", CqlType::Text)?
        .add_column("tags", CqlType::set(CqlType::Text))?
        .build()?;
    assert_eq!(
        built.to_cql(),
        "\n\tCREATE TABLE users(\n\t\tlogin text,\n\t\ttags set<text>,\n\t\tPRIMARY KEY(login))"
    );
    Ok(())
}

#[test]
fn test_create_table_rejects_reserved_column() -> SchemaResult<()> {
    let err = SchemaBuilder::create_table("users")?
        .add_partition_key("select", CqlType::Text)
        .err()
        .map(|err| err.to_string());
    assert_eq!(
        err.as_deref(),
        Some("The partition key name 'select' is not allowed because it is a reserved keyword")
    );
    Ok(())
}

#[test]
fn test_drop_table() -> SchemaResult<()> {
    assert_eq!(
        SchemaBuilder::drop_table_in("ks", "events")?
            .if_exists()
            .build()
            .to_cql(),
        "\n\tDROP TABLE IF EXISTS ks.events"
    );
    Ok(())
}

#[test]
fn test_create_composite_index() -> SchemaResult<()> {
    let built = SchemaBuilder::create_index("events_by_owner")?
        .if_not_exists()
        .on_table_in("ks", "events")?
        .column("owner")?
        .column("day")?
        .build()?;
    assert_eq!(
        built.to_cql(),
        "\n\tCREATE INDEX IF NOT EXISTS events_by_owner ON ks.events(owner, day)"
    );
    Ok(())
}

#[test]
fn test_create_index_requires_a_column() -> SchemaResult<()> {
    let result = SchemaBuilder::create_index("events_by_owner")?
        .on_table("events")?
        .build();
    assert!(matches!(result, Err(ValidationError::InvalidSchema(_))));
    Ok(())
}

#[test]
fn test_drop_index() -> SchemaResult<()> {
    assert_eq!(
        SchemaBuilder::drop_index("events_by_owner")?.build().to_cql(),
        "\n\tDROP INDEX events_by_owner"
    );
    assert_eq!(
        SchemaBuilder::drop_index_in("ks", "events_by_owner")?
            .if_exists()
            .build()
            .to_cql(),
        "\n\tDROP INDEX IF EXISTS ks.events_by_owner"
    );
    Ok(())
}

fn apply_option<B: TableOptionsBuilder>(builder: B, index: usize) -> B {
    match index {
        0 => builder.caching(Caching::KeysOnly),
        1 => builder.bloom_filter_fp_chance(0.1),
        2 => builder.comment("events by day"),
        3 => builder.compression_options(CompressionOptions::snappy().with_chunk_length_in_kb(64)),
        4 => builder.compaction_options(
            CompactionOptions::date_tiered_strategy()
                .timestamp_resolution(TimestampResolution::Milliseconds),
        ),
        5 => builder.dc_local_read_repair_chance(0.5),
        6 => builder.default_time_to_live(3600),
        7 => builder.gc_grace_seconds(864000),
        8 => builder.index_interval(128),
        9 => builder.memtable_flush_period_in_millis(1000),
        10 => builder.populate_io_cache_on_flush(false),
        11 => builder.read_repair_chance(0.0),
        12 => builder.replicate_on_write(false),
        _ => builder.speculative_retry(SpeculativeRetry::percentile(95)),
    }
}

const ALL_OPTIONS: &str = " WITH caching = 'keys_only' \
     AND bloom_filter_fp_chance = 0.1 \
     AND comment = 'events by day' \
     AND compression = {'sstable_compression' : 'SnappyCompressor', 'chunk_length_kb' : 64} \
     AND compaction = {'class' : 'DateTieredCompactionStrategy', 'timestamp_resolution' : 'MILLISECONDS'} \
     AND dclocal_read_repair_chance = 0.5 \
     AND default_time_to_live = 3600 \
     AND gc_grace_seconds = 864000 \
     AND index_interval = 128 \
     AND memtable_flush_period_in_ms = 1000 \
     AND populate_io_cache_on_flush = false \
     AND read_repair_chance = 0.0 \
     AND replicate_on_write = false \
     AND speculative_retry = '95PERCENTILE'";

proptest! {
    #[test]
    fn prop_option_order_is_fixed(order in Just((0..14).collect::<Vec<usize>>()).prop_shuffle()) {
        let builder = SchemaBuilder::alter_table("events").unwrap().with_options();
        let built = order
            .iter()
            .fold(builder, |builder, index| apply_option(builder, *index))
            .build()
            .unwrap();

        prop_assert_eq!(built.to_cql(), format!("\n\tALTER TABLE events{}", ALL_OPTIONS));
    }

    #[test]
    fn prop_option_subset_keeps_key_order(
        order in Just((0..14).collect::<Vec<usize>>()).prop_shuffle(),
        count in 1usize..14,
    ) {
        let chosen = &order[..count];
        let forward = chosen
            .iter()
            .fold(TableOptions::new(), |options, index| apply_option(options, *index));
        let backward = chosen
            .iter()
            .rev()
            .fold(TableOptions::new(), |options, index| apply_option(options, *index));

        prop_assert_eq!(forward.len(), count);
        prop_assert_eq!(&forward, &backward);

        let keys: Vec<OptionKey> = forward.iter().map(TableOption::key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        prop_assert_eq!(keys, sorted);
    }
}
