//! In-memory order collection for tests and database-less runs.
//!
//! Understands the subset of the MongoDB query language the order service
//! issues: equality filters on dotted paths, `$set` updates, and pipelines
//! built from `$unwind`, `$match` and `$group` with `$sum` accumulators.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use futures::StreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};

use super::{DocumentStream, OrderStore, StoreError, StoreResult};

#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    documents: Arc<RwLock<Vec<Document>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Vec<Document>>> {
        self.documents.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Vec<Document>>> {
        self.documents.write().map_err(|_| StoreError::Poisoned)
    }

    fn first_match(documents: &[Document], filter: &Document) -> StoreResult<Option<usize>> {
        for (index, document) in documents.iter().enumerate() {
            if matches_filter(document, filter)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert_one(&self, document: Document) -> StoreResult<()> {
        let mut stored = Document::new();
        if !document.contains_key("_id") {
            stored.insert("_id", ObjectId::new());
        }
        for (key, value) in document {
            stored.insert(key, value);
        }
        self.write()?.push(stored);
        Ok(())
    }

    async fn update_one(&self, filter: Document, update: Document) -> StoreResult<u64> {
        let assignments = set_assignments(&update)?;
        let mut documents = self.write()?;
        let Some(index) = Self::first_match(&documents, &filter)? else {
            return Ok(0);
        };

        let mut changed = false;
        for (path, value) in assignments {
            changed |= set_path(&mut documents[index], path, value.clone())?;
        }
        Ok(u64::from(changed))
    }

    async fn delete_one(&self, filter: Document) -> StoreResult<u64> {
        let mut documents = self.write()?;
        match Self::first_match(&documents, &filter)? {
            Some(index) => {
                documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn find(&self, filter: Document) -> StoreResult<DocumentStream> {
        let documents = self.read()?;
        let mut matched = Vec::new();
        for document in documents.iter() {
            if matches_filter(document, &filter)? {
                matched.push(document.clone());
            }
        }
        Ok(futures::stream::iter(matched.into_iter().map(Ok)).boxed())
    }

    async fn aggregate_first(&self, pipeline: Vec<Document>) -> StoreResult<Option<Document>> {
        let rows = self.read()?.clone();
        let output = run_pipeline(rows, &pipeline)?;
        Ok(output.into_iter().next())
    }
}

fn run_pipeline(mut rows: Vec<Document>, pipeline: &[Document]) -> StoreResult<Vec<Document>> {
    for stage in pipeline {
        let (name, spec) = single_entry(stage)?;
        rows = match name {
            "$unwind" => unwind(rows, spec)?,
            "$match" => {
                let filter = expect_document(name, spec)?;
                let mut kept = Vec::with_capacity(rows.len());
                for row in rows {
                    if matches_filter(&row, filter)? {
                        kept.push(row);
                    }
                }
                kept
            }
            "$group" => group(rows, expect_document(name, spec)?)?,
            other => return Err(StoreError::Unsupported(format!("pipeline stage {other}"))),
        };
    }
    Ok(rows)
}

fn single_entry(stage: &Document) -> StoreResult<(&str, &Bson)> {
    let mut entries = stage.iter();
    match (entries.next(), entries.next()) {
        (Some((name, spec)), None) => Ok((name.as_str(), spec)),
        _ => Err(StoreError::Unsupported(
            "pipeline stages must have exactly one key".into(),
        )),
    }
}

fn expect_document<'a>(stage: &str, spec: &'a Bson) -> StoreResult<&'a Document> {
    match spec {
        Bson::Document(document) => Ok(document),
        _ => Err(StoreError::Unsupported(format!("{stage} expects a document"))),
    }
}

/// Strips the leading `$` of a field path expression.
fn field_path(expr: &Bson) -> Option<&str> {
    match expr {
        Bson::String(path) => path.strip_prefix('$'),
        _ => None,
    }
}

fn unwind(rows: Vec<Document>, spec: &Bson) -> StoreResult<Vec<Document>> {
    let path = field_path(spec)
        .ok_or_else(|| StoreError::Unsupported("$unwind expects a \"$field\" path".into()))?;

    let mut output = Vec::new();
    for row in rows {
        let items = match get_path(&row, path) {
            Some(Bson::Array(items)) => Some(items.clone()),
            None | Some(Bson::Null) => continue,
            Some(_) => None,
        };
        // A non-array value passes through as a single element.
        let Some(items) = items else {
            output.push(row);
            continue;
        };
        for item in items {
            let mut unwound = row.clone();
            set_path(&mut unwound, path, item)?;
            output.push(unwound);
        }
    }
    Ok(output)
}

fn group(rows: Vec<Document>, spec: &Document) -> StoreResult<Vec<Document>> {
    let key_expr = spec
        .get("_id")
        .ok_or_else(|| StoreError::Unsupported("$group requires an _id".into()))?;

    let mut accumulators = Vec::new();
    for (field, expr) in spec.iter().filter(|(field, _)| field.as_str() != "_id") {
        let operand = match expr {
            Bson::Document(op) if op.len() == 1 && op.contains_key("$sum") => op.get("$sum"),
            _ => None,
        }
        .ok_or_else(|| StoreError::Unsupported(format!("accumulator for {field}")))?;
        accumulators.push((field.as_str(), operand));
    }

    let mut groups: Vec<(Bson, Vec<Sum>)> = Vec::new();
    for row in &rows {
        let key = evaluate(row, key_expr)?;
        let position = match groups.iter().position(|(existing, _)| bson_eq(existing, &key)) {
            Some(position) => position,
            None => {
                groups.push((key, vec![Sum::default(); accumulators.len()]));
                groups.len() - 1
            }
        };
        for (sum, (_, operand)) in groups[position].1.iter_mut().zip(&accumulators) {
            sum.add(&evaluate(row, operand)?);
        }
    }

    Ok(groups
        .into_iter()
        .map(|(key, sums)| {
            let mut output = Document::new();
            output.insert("_id", key);
            for (sum, (field, _)) in sums.into_iter().zip(&accumulators) {
                output.insert(*field, sum.finish());
            }
            output
        })
        .collect())
}

fn evaluate(row: &Document, expr: &Bson) -> StoreResult<Bson> {
    match expr {
        Bson::Document(_) | Bson::Array(_) => Err(StoreError::Unsupported(
            "only field paths and literals are supported as expressions".into(),
        )),
        _ => match field_path(expr) {
            Some(path) => Ok(get_path(row, path).cloned().unwrap_or(Bson::Null)),
            None => Ok(expr.clone()),
        },
    }
}

/// `$sum` accumulator. Integer sums stay Int32 until they leave its range,
/// then Int64; an Int64 overflow or any double turns the result into a double.
/// Non-numeric values are skipped.
#[derive(Clone, Copy, Debug, Default)]
struct Sum {
    integer: i64,
    float: f64,
    saw_long: bool,
    saw_double: bool,
}

impl Sum {
    fn add(&mut self, value: &Bson) {
        match value {
            Bson::Int32(v) => self.add_integer(i64::from(*v)),
            Bson::Int64(v) => {
                self.add_integer(*v);
                self.saw_long = true;
            }
            Bson::Double(v) => {
                self.float += v;
                self.saw_double = true;
            }
            _ => {}
        }
    }

    fn add_integer(&mut self, value: i64) {
        match self.integer.checked_add(value) {
            Some(total) => self.integer = total,
            None => {
                self.float += value as f64;
                self.saw_double = true;
            }
        }
    }

    fn finish(self) -> Bson {
        if self.saw_double {
            Bson::Double(self.integer as f64 + self.float)
        } else if self.saw_long {
            Bson::Int64(self.integer)
        } else {
            match i32::try_from(self.integer) {
                Ok(v) => Bson::Int32(v),
                Err(_) => Bson::Int64(self.integer),
            }
        }
    }
}

fn matches_filter(document: &Document, filter: &Document) -> StoreResult<bool> {
    for (path, expected) in filter {
        if path.starts_with('$') {
            return Err(StoreError::Unsupported(format!("filter operator {path}")));
        }
        if let Bson::Document(inner) = expected {
            if inner.keys().any(|key| key.starts_with('$')) {
                return Err(StoreError::Unsupported(format!("query operators on {path}")));
            }
        }

        let mut values = Vec::new();
        collect_path_values(document, path, &mut values);
        let matched = if values.is_empty() {
            *expected == Bson::Null
        } else {
            values.iter().any(|value| match value {
                Bson::Array(items) => {
                    bson_eq(value, expected) || items.iter().any(|item| bson_eq(item, expected))
                }
                _ => bson_eq(value, expected),
            })
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Collects every value reachable at `path`, descending into arrays of
/// sub-documents the way MongoDB's query matcher does.
fn collect_path_values<'a>(document: &'a Document, path: &str, out: &mut Vec<&'a Bson>) {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };
    let Some(value) = document.get(head) else {
        return;
    };
    match rest {
        None => out.push(value),
        Some(rest) => descend(value, rest, out),
    }
}

fn descend<'a>(value: &'a Bson, rest: &str, out: &mut Vec<&'a Bson>) {
    match value {
        Bson::Document(inner) => collect_path_values(inner, rest, out),
        Bson::Array(items) => {
            for item in items {
                if let Bson::Document(inner) = item {
                    collect_path_values(inner, rest, out);
                }
            }
        }
        _ => {}
    }
}

fn get_path<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    match path.split_once('.') {
        None => document.get(path),
        Some((head, rest)) => match document.get(head)? {
            Bson::Document(inner) => get_path(inner, rest),
            _ => None,
        },
    }
}

/// Writes `value` at a dotted path, creating intermediate documents.
/// Returns whether the stored value changed.
fn set_path(document: &mut Document, path: &str, value: Bson) -> StoreResult<bool> {
    match path.split_once('.') {
        None => {
            let changed = document.get(path) != Some(&value);
            document.insert(path, value);
            Ok(changed)
        }
        Some((head, rest)) => {
            if !document.contains_key(head) {
                document.insert(head, Document::new());
            }
            match document.get_mut(head) {
                Some(Bson::Document(inner)) => set_path(inner, rest, value),
                _ => Err(StoreError::Unsupported(format!(
                    "cannot create field in non-document at {head}"
                ))),
            }
        }
    }
}

fn set_assignments(update: &Document) -> StoreResult<Vec<(&str, &Bson)>> {
    let mut assignments = Vec::new();
    for (operator, fields) in update {
        match (operator.as_str(), fields) {
            ("$set", Bson::Document(fields)) => {
                assignments.extend(fields.iter().map(|(path, value)| (path.as_str(), value)));
            }
            _ => return Err(StoreError::Unsupported(format!("update operator {operator}"))),
        }
    }
    Ok(assignments)
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

/// Equality with numeric values compared across Int32, Int64 and Double.
fn bson_eq(left: &Bson, right: &Bson) -> bool {
    match (as_number(left), as_number(right)) {
        (Some(l), Some(r)) => l == r,
        _ => left == right,
    }
}
