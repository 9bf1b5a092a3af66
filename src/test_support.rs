#![cfg(test)]

// Test-only fixtures: a scripted collection, a scripted cursor and a small
// person/address domain with its store shapes.
use crate::errors::DbError;
use crate::query::{Collection, DeleteReport, DocumentCursor, UpdateReport};
use bson::Document;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub const TEST_ID: &str = "1";
pub const TEST_ADDRESS_ID: &str = "2";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub id: String,
    pub name: String,
    pub age: i32,
    pub addresses: Vec<Address>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub id: String,
    pub street: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorePerson {
    pub id: String,
    pub name: String,
    pub age: i32,
    pub addresses: Vec<StoreAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreAddress {
    pub id: String,
    pub street: String,
}

pub fn address() -> Address {
    Address { id: TEST_ADDRESS_ID.into(), street: "Main St".into() }
}

pub fn person() -> Person {
    Person { id: TEST_ID.into(), name: "John".into(), age: 30, addresses: vec![address()] }
}

pub fn store_person() -> StorePerson {
    to_store_person(&person())
}

pub fn store_person_doc() -> Document {
    bson::to_document(&store_person()).expect("encode fixture")
}

pub fn to_store_address(a: &Address) -> StoreAddress {
    StoreAddress { id: a.id.clone(), street: a.street.clone() }
}

pub fn from_store_address(a: StoreAddress) -> Address {
    Address { id: a.id, street: a.street }
}

pub fn to_store_person(p: &Person) -> StorePerson {
    StorePerson {
        id: p.id.clone(),
        name: p.name.clone(),
        age: p.age,
        addresses: p.addresses.iter().map(to_store_address).collect(),
    }
}

pub fn from_store_person(p: StorePerson) -> Person {
    Person {
        id: p.id,
        name: p.name,
        age: p.age,
        addresses: p.addresses.into_iter().map(from_store_address).collect(),
    }
}

pub fn first_address(p: StorePerson) -> Address {
    p.addresses.into_iter().next().map(from_store_address).unwrap_or_default()
}

pub fn addresses(p: StorePerson) -> Vec<Address> {
    p.addresses.into_iter().map(from_store_address).collect()
}

pub fn project_name(p: StorePerson) -> String {
    p.name
}

pub fn forced_error() -> DbError {
    DbError::Io("forced error".into())
}

/// One recorded call against [`MockCollection`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub op: &'static str,
    pub filter: Document,
    /// Inserted document or update document.
    pub document: Option<Document>,
    pub projection: Option<Document>,
}

type Reply<R> = Box<dyn Fn() -> Result<R, DbError> + Send + Sync>;

/// A collection named `persons` answering from scripted replies.
#[derive(Default)]
pub struct MockCollection {
    insert_one: Option<Reply<()>>,
    update_one: Option<Reply<UpdateReport>>,
    delete_one: Option<Reply<DeleteReport>>,
    delete_many: Option<Reply<DeleteReport>>,
    find_one: Option<Reply<Option<Document>>>,
    find: Option<Reply<Box<dyn DocumentCursor>>>,
    count_documents: Option<Reply<u64>>,
    calls: Mutex<Vec<Call>>,
}

impl MockCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_insert_one(mut self, f: impl Fn() -> Result<(), DbError> + Send + Sync + 'static) -> Self {
        self.insert_one = Some(Box::new(f));
        self
    }

    pub fn on_update_one(
        mut self,
        f: impl Fn() -> Result<UpdateReport, DbError> + Send + Sync + 'static,
    ) -> Self {
        self.update_one = Some(Box::new(f));
        self
    }

    pub fn on_delete_one(
        mut self,
        f: impl Fn() -> Result<DeleteReport, DbError> + Send + Sync + 'static,
    ) -> Self {
        self.delete_one = Some(Box::new(f));
        self
    }

    pub fn on_delete_many(
        mut self,
        f: impl Fn() -> Result<DeleteReport, DbError> + Send + Sync + 'static,
    ) -> Self {
        self.delete_many = Some(Box::new(f));
        self
    }

    pub fn on_find_one(
        mut self,
        f: impl Fn() -> Result<Option<Document>, DbError> + Send + Sync + 'static,
    ) -> Self {
        self.find_one = Some(Box::new(f));
        self
    }

    pub fn on_find(
        mut self,
        f: impl Fn() -> Result<Box<dyn DocumentCursor>, DbError> + Send + Sync + 'static,
    ) -> Self {
        self.find = Some(Box::new(f));
        self
    }

    pub fn on_count_documents(
        mut self,
        f: impl Fn() -> Result<u64, DbError> + Send + Sync + 'static,
    ) -> Self {
        self.count_documents = Some(Box::new(f));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn last_call(&self) -> Call {
        self.calls.lock().last().cloned().expect("no call recorded")
    }

    fn record(
        &self,
        op: &'static str,
        filter: &Document,
        document: Option<&Document>,
        projection: Option<&Document>,
    ) {
        self.calls.lock().push(Call {
            op,
            filter: filter.clone(),
            document: document.cloned(),
            projection: projection.cloned(),
        });
    }
}

fn reply<R>(r: &Option<Reply<R>>, op: &str) -> Result<R, DbError> {
    match r {
        Some(f) => f(),
        None => Err(DbError::Io(format!("{op} not implemented"))),
    }
}

impl Collection for MockCollection {
    fn name(&self) -> &str {
        "persons"
    }

    fn insert_one(&self, document: Document) -> Result<(), DbError> {
        self.record("insert_one", &Document::new(), Some(&document), None);
        reply(&self.insert_one, "insert_one")
    }

    fn update_one(&self, filter: &Document, update: &Document) -> Result<UpdateReport, DbError> {
        self.record("update_one", filter, Some(update), None);
        reply(&self.update_one, "update_one")
    }

    fn delete_one(&self, filter: &Document) -> Result<DeleteReport, DbError> {
        self.record("delete_one", filter, None, None);
        reply(&self.delete_one, "delete_one")
    }

    fn delete_many(&self, filter: &Document) -> Result<DeleteReport, DbError> {
        self.record("delete_many", filter, None, None);
        reply(&self.delete_many, "delete_many")
    }

    fn find_one(
        &self,
        filter: &Document,
        projection: Option<&Document>,
    ) -> Result<Option<Document>, DbError> {
        self.record("find_one", filter, None, projection);
        reply(&self.find_one, "find_one")
    }

    fn find(
        &self,
        filter: &Document,
        projection: Option<&Document>,
    ) -> Result<Box<dyn DocumentCursor>, DbError> {
        self.record("find", filter, None, projection);
        reply(&self.find, "find")
    }

    fn count_documents(&self, filter: &Document) -> Result<u64, DbError> {
        self.record("count_documents", filter, None, None);
        reply(&self.count_documents, "count_documents")
    }
}

/// A cursor over fixed documents that can be told to fail.
pub struct MockCursor {
    docs: Option<Result<Vec<Document>, String>>,
    close_error: Option<String>,
    closed: Arc<AtomicBool>,
}

impl MockCursor {
    pub fn new(docs: Vec<Document>) -> Self {
        Self { docs: Some(Ok(docs)), close_error: None, closed: Arc::new(AtomicBool::new(false)) }
    }

    pub fn failing_read(message: &str) -> Self {
        Self {
            docs: Some(Err(message.to_owned())),
            close_error: None,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn failing_close(mut self, message: &str) -> Self {
        self.close_error = Some(message.to_owned());
        self
    }

    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

impl DocumentCursor for MockCursor {
    fn all(&mut self) -> Result<Vec<Document>, DbError> {
        match self.docs.take() {
            Some(Ok(docs)) => Ok(docs),
            Some(Err(message)) => Err(DbError::CursorError(message)),
            None => Err(DbError::CursorClosed),
        }
    }

    fn close(&mut self) -> Result<(), DbError> {
        self.closed.store(true, Ordering::SeqCst);
        match &self.close_error {
            Some(message) => Err(DbError::CursorError(message.clone())),
            None => Ok(()),
        }
    }
}
