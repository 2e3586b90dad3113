use arrow_schema::{Schema, Field, DataType, TimeUnit};
use std::sync::Arc;

/// One row per verse: metadata columns plus the embedded translation.
pub fn build_verse_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("id", DataType::Utf8, false),
		Field::new("chapter", DataType::Int32, false),
		Field::new("verse", DataType::Int32, false),
		Field::new("text", DataType::Utf8, false),
		Field::new("translation", DataType::Utf8, false),
		Field::new("transliteration", DataType::Utf8, false),
		Field::new("annotations", DataType::Utf8, false),
		Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}

pub fn build_meta_schema() -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("key", DataType::Utf8, false),
		Field::new("value", DataType::Utf8, false),
		Field::new("updated_at", DataType::Timestamp(TimeUnit::Millisecond, None), false),
	]))
}
