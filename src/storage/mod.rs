use anyhow::Result;
use std::future::Future;
use std::pin::Pin;

use crate::model::{Column, Document, RecordSetHandle, RecordSetInfo, SentenceRecord};

mod local;

pub use local::LocalStore;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Read access to source documents.
pub trait DocumentStore: Send + Sync {
    fn fetch<'a>(&'a self, document_id: &'a str) -> StoreFuture<'a, Document>;
    fn create<'a>(&'a self, title: &'a str) -> StoreFuture<'a, String>;
}

/// Tabular record sets with a fixed `front, back, pinyin` header. Row
/// indices exclude the header.
pub trait RecordStore: Send + Sync {
    fn create_record_set<'a>(&'a self, title: &'a str) -> StoreFuture<'a, RecordSetHandle>;
    fn write_rows<'a>(
        &'a self,
        record_set_id: &'a str,
        section: &'a str,
        rows: &'a [SentenceRecord],
    ) -> StoreFuture<'a, ()>;
    fn read_rows<'a>(
        &'a self,
        record_set_id: &'a str,
        section: &'a str,
    ) -> StoreFuture<'a, Vec<SentenceRecord>>;
    fn sections<'a>(&'a self, record_set_id: &'a str) -> StoreFuture<'a, Vec<String>>;
    fn list_record_sets(&self) -> StoreFuture<'_, Vec<RecordSetInfo>>;
    fn update_column<'a>(
        &'a self,
        record_set_id: &'a str,
        section: &'a str,
        column: Column,
        values: &'a [String],
    ) -> StoreFuture<'a, ()>;
    fn resize_columns<'a>(&'a self, record_set_id: &'a str) -> StoreFuture<'a, ()>;
}
