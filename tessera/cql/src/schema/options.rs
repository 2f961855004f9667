//! Table options
//!
//! Every option is a variant of [`TableOption`] with its own literal grammar.
//! [`TableOptions`] keys them by [`OptionKey`], whose declaration order is the
//! serialization order, so the order in which options are set never leaks
//! into the generated statement.

use crate::error::{SchemaResult, ValidationError};
use std::collections::BTreeMap;
use std::fmt;

/// Row/key cache setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caching {
    All,
    KeysOnly,
    RowsOnly,
    None,
}

impl Caching {
    pub fn as_str(self) -> &'static str {
        match self {
            Caching::All => "all",
            Caching::KeysOnly => "keys_only",
            Caching::RowsOnly => "rows_only",
            Caching::None => "none",
        }
    }
}

/// Resolution used by the date-tiered strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampResolution {
    Microseconds,
    Milliseconds,
}

impl TimestampResolution {
    pub fn as_str(self) -> &'static str {
        match self {
            TimestampResolution::Microseconds => "MICROSECONDS",
            TimestampResolution::Milliseconds => "MILLISECONDS",
        }
    }
}

/// Compaction strategy with its strategy-specific sub-options
#[derive(Debug, Clone, PartialEq)]
pub enum CompactionStrategy {
    SizedTiered {
        bucket_high: Option<f64>,
        bucket_low: Option<f64>,
        cold_reads_to_omit: Option<f64>,
        min_threshold: Option<i32>,
        max_threshold: Option<i32>,
        min_sstable_size_in_bytes: Option<i64>,
    },
    Leveled {
        sstable_size_in_mb: Option<i32>,
    },
    DateTiered {
        base_time_seconds: Option<i64>,
        max_sstable_age_days: Option<i64>,
        timestamp_resolution: Option<TimestampResolution>,
    },
}

impl CompactionStrategy {
    pub fn class_name(&self) -> &'static str {
        match self {
            CompactionStrategy::SizedTiered { .. } => "SizeTieredCompactionStrategy",
            CompactionStrategy::Leveled { .. } => "LeveledCompactionStrategy",
            CompactionStrategy::DateTiered { .. } => "DateTieredCompactionStrategy",
        }
    }

    fn push_entries(&self, entries: &mut Vec<(&'static str, String)>) {
        match self {
            CompactionStrategy::SizedTiered {
                bucket_high,
                bucket_low,
                cold_reads_to_omit,
                min_threshold,
                max_threshold,
                min_sstable_size_in_bytes,
            } => {
                push_opt(entries, "bucket_high", bucket_high.map(format_decimal));
                push_opt(entries, "bucket_low", bucket_low.map(format_decimal));
                push_opt(
                    entries,
                    "cold_reads_to_omit",
                    cold_reads_to_omit.map(format_decimal),
                );
                push_opt(entries, "min_threshold", min_threshold.map(|v| v.to_string()));
                push_opt(entries, "max_threshold", max_threshold.map(|v| v.to_string()));
                push_opt(
                    entries,
                    "min_sstable_size",
                    min_sstable_size_in_bytes.map(|v| v.to_string()),
                );
            }
            CompactionStrategy::Leveled { sstable_size_in_mb } => {
                push_opt(
                    entries,
                    "sstable_size_in_mb",
                    sstable_size_in_mb.map(|v| v.to_string()),
                );
            }
            CompactionStrategy::DateTiered {
                base_time_seconds,
                max_sstable_age_days,
                timestamp_resolution,
            } => {
                push_opt(
                    entries,
                    "base_time_seconds",
                    base_time_seconds.map(|v| v.to_string()),
                );
                push_opt(
                    entries,
                    "max_sstable_age_days",
                    max_sstable_age_days.map(|v| v.to_string()),
                );
                push_opt(
                    entries,
                    "timestamp_resolution",
                    timestamp_resolution.map(|r| quote(r.as_str())),
                );
            }
        }
    }
}

/// Compaction option: strategy plus the sub-options shared by every strategy
#[derive(Debug, Clone, PartialEq)]
pub struct CompactionOptions {
    pub strategy: CompactionStrategy,
    pub enabled: Option<bool>,
    pub tombstone_compaction_interval: Option<i64>,
    pub tombstone_threshold: Option<f64>,
    pub unchecked_tombstone_compaction: Option<bool>,
}

impl CompactionOptions {
    fn with_strategy(strategy: CompactionStrategy) -> Self {
        Self {
            strategy,
            enabled: None,
            tombstone_compaction_interval: None,
            tombstone_threshold: None,
            unchecked_tombstone_compaction: None,
        }
    }

    pub fn sized_tiered_strategy() -> Self {
        Self::with_strategy(CompactionStrategy::SizedTiered {
            bucket_high: None,
            bucket_low: None,
            cold_reads_to_omit: None,
            min_threshold: None,
            max_threshold: None,
            min_sstable_size_in_bytes: None,
        })
    }

    pub fn leveled_strategy() -> Self {
        Self::with_strategy(CompactionStrategy::Leveled {
            sstable_size_in_mb: None,
        })
    }

    pub fn date_tiered_strategy() -> Self {
        Self::with_strategy(CompactionStrategy::DateTiered {
            base_time_seconds: None,
            max_sstable_age_days: None,
            timestamp_resolution: None,
        })
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn tombstone_compaction_interval_in_day(mut self, days: i64) -> Self {
        self.tombstone_compaction_interval = Some(days);
        self
    }

    pub fn tombstone_threshold(mut self, ratio: f64) -> Self {
        self.tombstone_threshold = Some(ratio);
        self
    }

    pub fn unchecked_tombstone_compaction(mut self, unchecked: bool) -> Self {
        self.unchecked_tombstone_compaction = Some(unchecked);
        self
    }

    /// Leveled strategy only; ignored by other strategies
    pub fn ss_table_size_in_mb(mut self, size: i32) -> Self {
        if let CompactionStrategy::Leveled { sstable_size_in_mb } = &mut self.strategy {
            *sstable_size_in_mb = Some(size);
        }
        self
    }

    /// Size-tiered strategy only
    pub fn bucket_high(mut self, value: f64) -> Self {
        if let CompactionStrategy::SizedTiered { bucket_high, .. } = &mut self.strategy {
            *bucket_high = Some(value);
        }
        self
    }

    /// Size-tiered strategy only
    pub fn bucket_low(mut self, value: f64) -> Self {
        if let CompactionStrategy::SizedTiered { bucket_low, .. } = &mut self.strategy {
            *bucket_low = Some(value);
        }
        self
    }

    /// Size-tiered strategy only
    pub fn cold_reads_ratio_to_omit(mut self, ratio: f64) -> Self {
        if let CompactionStrategy::SizedTiered {
            cold_reads_to_omit, ..
        } = &mut self.strategy
        {
            *cold_reads_to_omit = Some(ratio);
        }
        self
    }

    /// Size-tiered strategy only
    pub fn min_threshold(mut self, value: i32) -> Self {
        if let CompactionStrategy::SizedTiered { min_threshold, .. } = &mut self.strategy {
            *min_threshold = Some(value);
        }
        self
    }

    /// Size-tiered strategy only
    pub fn max_threshold(mut self, value: i32) -> Self {
        if let CompactionStrategy::SizedTiered { max_threshold, .. } = &mut self.strategy {
            *max_threshold = Some(value);
        }
        self
    }

    /// Size-tiered strategy only
    pub fn min_sstable_size_in_bytes(mut self, bytes: i64) -> Self {
        if let CompactionStrategy::SizedTiered {
            min_sstable_size_in_bytes,
            ..
        } = &mut self.strategy
        {
            *min_sstable_size_in_bytes = Some(bytes);
        }
        self
    }

    /// Date-tiered strategy only
    pub fn base_time_seconds(mut self, seconds: i64) -> Self {
        if let CompactionStrategy::DateTiered {
            base_time_seconds, ..
        } = &mut self.strategy
        {
            *base_time_seconds = Some(seconds);
        }
        self
    }

    /// Date-tiered strategy only
    pub fn max_sstable_age_days(mut self, days: i64) -> Self {
        if let CompactionStrategy::DateTiered {
            max_sstable_age_days,
            ..
        } = &mut self.strategy
        {
            *max_sstable_age_days = Some(days);
        }
        self
    }

    /// Date-tiered strategy only
    pub fn timestamp_resolution(mut self, resolution: TimestampResolution) -> Self {
        if let CompactionStrategy::DateTiered {
            timestamp_resolution,
            ..
        } = &mut self.strategy
        {
            *timestamp_resolution = Some(resolution);
        }
        self
    }

    fn decimals(&self) -> Vec<f64> {
        let mut decimals: Vec<f64> = self.tombstone_threshold.into_iter().collect();
        if let CompactionStrategy::SizedTiered {
            bucket_high,
            bucket_low,
            cold_reads_to_omit,
            ..
        } = &self.strategy
        {
            decimals.extend([bucket_high, bucket_low, cold_reads_to_omit].into_iter().flatten());
        }
        decimals
    }

    fn to_literal(&self) -> String {
        let mut entries = vec![("class", quote(self.strategy.class_name()))];
        push_opt(&mut entries, "enabled", self.enabled.map(|v| v.to_string()));
        push_opt(
            &mut entries,
            "tombstone_compaction_interval",
            self.tombstone_compaction_interval.map(|v| v.to_string()),
        );
        push_opt(
            &mut entries,
            "tombstone_threshold",
            self.tombstone_threshold.map(format_decimal),
        );
        push_opt(
            &mut entries,
            "unchecked_tombstone_compaction",
            self.unchecked_tombstone_compaction.map(|v| v.to_string()),
        );
        self.strategy.push_entries(&mut entries);
        map_literal(&entries)
    }
}

/// SSTable compressor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compressor {
    None,
    Lz4,
    Snappy,
    Deflate,
}

impl Compressor {
    /// Internal compressor class name
    pub fn class_name(self) -> &'static str {
        match self {
            Compressor::None => "",
            Compressor::Lz4 => "LZ4Compressor",
            Compressor::Snappy => "SnappyCompressor",
            Compressor::Deflate => "DeflateCompressor",
        }
    }
}

/// Compression option
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionOptions {
    pub compressor: Compressor,
    pub chunk_length_kb: Option<i32>,
    pub crc_check_chance: Option<f64>,
}

impl CompressionOptions {
    fn with_compressor(compressor: Compressor) -> Self {
        Self {
            compressor,
            chunk_length_kb: None,
            crc_check_chance: None,
        }
    }

    pub fn none() -> Self {
        Self::with_compressor(Compressor::None)
    }

    pub fn lz4() -> Self {
        Self::with_compressor(Compressor::Lz4)
    }

    pub fn snappy() -> Self {
        Self::with_compressor(Compressor::Snappy)
    }

    pub fn deflate() -> Self {
        Self::with_compressor(Compressor::Deflate)
    }

    pub fn with_chunk_length_in_kb(mut self, kb: i32) -> Self {
        self.chunk_length_kb = Some(kb);
        self
    }

    pub fn with_crc_check_chance(mut self, chance: f64) -> Self {
        self.crc_check_chance = Some(chance);
        self
    }

    fn to_literal(&self) -> String {
        let mut entries = vec![("sstable_compression", quote(self.compressor.class_name()))];
        push_opt(
            &mut entries,
            "chunk_length_kb",
            self.chunk_length_kb.map(|v| v.to_string()),
        );
        push_opt(
            &mut entries,
            "crc_check_chance",
            self.crc_check_chance.map(format_decimal),
        );
        map_literal(&entries)
    }
}

/// Speculative retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeculativeRetry {
    None,
    Always,
    Percentile(u32),
    Millis(u32),
}

impl SpeculativeRetry {
    pub fn none() -> Self {
        SpeculativeRetry::None
    }

    pub fn always() -> Self {
        SpeculativeRetry::Always
    }

    pub fn percentile(percentile: u32) -> Self {
        SpeculativeRetry::Percentile(percentile)
    }

    pub fn millisecs(millis: u32) -> Self {
        SpeculativeRetry::Millis(millis)
    }

    fn to_literal(self) -> String {
        let value = match self {
            SpeculativeRetry::None => "none".to_string(),
            SpeculativeRetry::Always => "always".to_string(),
            SpeculativeRetry::Percentile(p) => format!("{}percentile", p),
            SpeculativeRetry::Millis(ms) => format!("{}ms", ms),
        };
        quote(&value.to_uppercase())
    }
}

/// Option keys in serialization order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    Caching,
    BloomFilterFpChance,
    Comment,
    Compression,
    Compaction,
    DcLocalReadRepairChance,
    DefaultTimeToLive,
    GcGraceSeconds,
    IndexInterval,
    MemtableFlushPeriodInMs,
    PopulateIoCacheOnFlush,
    ReadRepairChance,
    ReplicateOnWrite,
    SpeculativeRetry,
}

impl OptionKey {
    pub fn as_str(self) -> &'static str {
        match self {
            OptionKey::Caching => "caching",
            OptionKey::BloomFilterFpChance => "bloom_filter_fp_chance",
            OptionKey::Comment => "comment",
            OptionKey::Compression => "compression",
            OptionKey::Compaction => "compaction",
            OptionKey::DcLocalReadRepairChance => "dclocal_read_repair_chance",
            OptionKey::DefaultTimeToLive => "default_time_to_live",
            OptionKey::GcGraceSeconds => "gc_grace_seconds",
            OptionKey::IndexInterval => "index_interval",
            OptionKey::MemtableFlushPeriodInMs => "memtable_flush_period_in_ms",
            OptionKey::PopulateIoCacheOnFlush => "populate_io_cache_on_flush",
            OptionKey::ReadRepairChance => "read_repair_chance",
            OptionKey::ReplicateOnWrite => "replicate_on_write",
            OptionKey::SpeculativeRetry => "speculative_retry",
        }
    }
}

/// A single table option
#[derive(Debug, Clone, PartialEq)]
pub enum TableOption {
    Caching(Caching),
    BloomFilterFpChance(f64),
    Comment(String),
    Compression(CompressionOptions),
    Compaction(CompactionOptions),
    DcLocalReadRepairChance(f64),
    DefaultTimeToLive(i32),
    GcGraceSeconds(i64),
    IndexInterval(i32),
    MemtableFlushPeriodInMs(i64),
    PopulateIoCacheOnFlush(bool),
    ReadRepairChance(f64),
    ReplicateOnWrite(bool),
    SpeculativeRetry(SpeculativeRetry),
}

impl TableOption {
    pub fn key(&self) -> OptionKey {
        match self {
            TableOption::Caching(_) => OptionKey::Caching,
            TableOption::BloomFilterFpChance(_) => OptionKey::BloomFilterFpChance,
            TableOption::Comment(_) => OptionKey::Comment,
            TableOption::Compression(_) => OptionKey::Compression,
            TableOption::Compaction(_) => OptionKey::Compaction,
            TableOption::DcLocalReadRepairChance(_) => OptionKey::DcLocalReadRepairChance,
            TableOption::DefaultTimeToLive(_) => OptionKey::DefaultTimeToLive,
            TableOption::GcGraceSeconds(_) => OptionKey::GcGraceSeconds,
            TableOption::IndexInterval(_) => OptionKey::IndexInterval,
            TableOption::MemtableFlushPeriodInMs(_) => OptionKey::MemtableFlushPeriodInMs,
            TableOption::PopulateIoCacheOnFlush(_) => OptionKey::PopulateIoCacheOnFlush,
            TableOption::ReadRepairChance(_) => OptionKey::ReadRepairChance,
            TableOption::ReplicateOnWrite(_) => OptionKey::ReplicateOnWrite,
            TableOption::SpeculativeRetry(_) => OptionKey::SpeculativeRetry,
        }
    }

    /// Decimal values carried by this option, sub-options included
    fn decimals(&self) -> Vec<f64> {
        match self {
            TableOption::BloomFilterFpChance(v)
            | TableOption::DcLocalReadRepairChance(v)
            | TableOption::ReadRepairChance(v) => vec![*v],
            TableOption::Compression(compression) => {
                compression.crc_check_chance.into_iter().collect()
            }
            TableOption::Compaction(compaction) => compaction.decimals(),
            _ => Vec::new(),
        }
    }

    /// Value literal, without the key
    pub fn literal(&self) -> String {
        match self {
            TableOption::Caching(caching) => quote(caching.as_str()),
            TableOption::BloomFilterFpChance(v)
            | TableOption::DcLocalReadRepairChance(v)
            | TableOption::ReadRepairChance(v) => format_decimal(*v),
            TableOption::Comment(comment) => quote(comment),
            TableOption::Compression(compression) => compression.to_literal(),
            TableOption::Compaction(compaction) => compaction.to_literal(),
            TableOption::DefaultTimeToLive(v) | TableOption::IndexInterval(v) => v.to_string(),
            TableOption::GcGraceSeconds(v) | TableOption::MemtableFlushPeriodInMs(v) => {
                v.to_string()
            }
            TableOption::PopulateIoCacheOnFlush(v) | TableOption::ReplicateOnWrite(v) => {
                v.to_string()
            }
            TableOption::SpeculativeRetry(retry) => retry.to_literal(),
        }
    }
}

impl fmt::Display for TableOption {
    /// `<key> = <literal>`, no surrounding `AND`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.key().as_str(), self.literal())
    }
}

/// Options explicitly set on a builder, kept in serialization order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableOptions {
    entries: BTreeMap<OptionKey, TableOption>,
}

impl TableOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, replacing any previous value under the same key
    pub fn set(&mut self, option: TableOption) {
        self.entries.insert(option.key(), option);
    }

    pub fn get(&self, key: OptionKey) -> Option<&TableOption> {
        self.entries.get(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Options in serialization order
    pub fn iter(&self) -> impl Iterator<Item = &TableOption> {
        self.entries.values()
    }

    /// Reject NaN and infinite decimals, which have no CQL literal
    pub fn validate(&self) -> SchemaResult<()> {
        for option in self.iter() {
            if let Some(value) = option.decimals().into_iter().find(|v| !v.is_finite()) {
                return Err(ValidationError::InvalidSchema(format!(
                    "Option '{}' should be a finite number, got {}",
                    option.key().as_str(),
                    value
                )));
            }
        }
        Ok(())
    }
}

/// Option-accumulating builder methods shared by every statement accepting
/// table options
pub trait TableOptionsBuilder: Sized {
    fn options_mut(&mut self) -> &mut TableOptions;

    fn caching(mut self, caching: Caching) -> Self {
        self.options_mut().set(TableOption::Caching(caching));
        self
    }

    fn bloom_filter_fp_chance(mut self, chance: f64) -> Self {
        self.options_mut().set(TableOption::BloomFilterFpChance(chance));
        self
    }

    fn comment(mut self, comment: impl Into<String>) -> Self {
        self.options_mut().set(TableOption::Comment(comment.into()));
        self
    }

    fn compression_options(mut self, compression: CompressionOptions) -> Self {
        self.options_mut().set(TableOption::Compression(compression));
        self
    }

    fn compaction_options(mut self, compaction: CompactionOptions) -> Self {
        self.options_mut().set(TableOption::Compaction(compaction));
        self
    }

    fn dc_local_read_repair_chance(mut self, chance: f64) -> Self {
        self.options_mut()
            .set(TableOption::DcLocalReadRepairChance(chance));
        self
    }

    fn default_time_to_live(mut self, seconds: i32) -> Self {
        self.options_mut().set(TableOption::DefaultTimeToLive(seconds));
        self
    }

    fn gc_grace_seconds(mut self, seconds: i64) -> Self {
        self.options_mut().set(TableOption::GcGraceSeconds(seconds));
        self
    }

    fn index_interval(mut self, interval: i32) -> Self {
        self.options_mut().set(TableOption::IndexInterval(interval));
        self
    }

    fn memtable_flush_period_in_millis(mut self, millis: i64) -> Self {
        self.options_mut()
            .set(TableOption::MemtableFlushPeriodInMs(millis));
        self
    }

    fn populate_io_cache_on_flush(mut self, populate: bool) -> Self {
        self.options_mut()
            .set(TableOption::PopulateIoCacheOnFlush(populate));
        self
    }

    fn read_repair_chance(mut self, chance: f64) -> Self {
        self.options_mut().set(TableOption::ReadRepairChance(chance));
        self
    }

    fn replicate_on_write(mut self, replicate: bool) -> Self {
        self.options_mut().set(TableOption::ReplicateOnWrite(replicate));
        self
    }

    fn speculative_retry(mut self, retry: SpeculativeRetry) -> Self {
        self.options_mut().set(TableOption::SpeculativeRetry(retry));
        self
    }
}

impl TableOptionsBuilder for TableOptions {
    fn options_mut(&mut self) -> &mut TableOptions {
        self
    }
}

/// Single-quoted string literal with embedded quotes doubled
pub(crate) fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Raw decimal; integral values keep one fractional digit. Callers pass finite
/// values only, see [`TableOptions::validate`]
pub(crate) fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// `{'k1' : v1, 'k2' : v2}`
pub(crate) fn map_literal(entries: &[(&str, String)]) -> String {
    let body = entries
        .iter()
        .map(|(key, value)| format!("{} : {}", quote(key), value))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", body)
}

fn push_opt(entries: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<String>) {
    if let Some(value) = value {
        entries.push((key, value));
    }
}
