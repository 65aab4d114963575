//! In-process collaborator with search, sort and page slicing.
//!
//! Serves screens whose endpoint returns a whole array, and stands in for the
//! backend in tests. Deletion honours the usage-count guard like the server.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use senselib_kernel::query::total_pages;
use senselib_kernel::{ApiError, Collaborator, Entity, Id, ListQuery, Page, SortDirection};
use serde::Serialize;
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    ToggleActive,
    Delete,
}

pub struct MemoryCollaborator<E> {
    state: Mutex<StoreState<E>>,
}

struct StoreState<E> {
    records: Vec<E>,
    next_id: i64,
    failures: HashMap<Operation, VecDeque<ApiError>>,
    calls: HashMap<Operation, usize>,
}

impl<E: Entity> MemoryCollaborator<E> {
    pub fn new(records: Vec<E>) -> Self {
        let next_id = records.iter().map(|r| r.id().0).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(StoreState {
                records,
                next_id,
                failures: HashMap::new(),
                calls: HashMap::new(),
            }),
        }
    }

    /// Make the next call of `operation` fail with `error`.
    pub fn fail_next(&self, operation: Operation, error: ApiError) {
        self.lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Number of calls received for `operation`, failed ones included.
    pub fn calls(&self, operation: Operation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    pub fn records(&self) -> Vec<E> {
        self.lock().records.clone()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, operation: Operation) -> Result<MutexGuard<'_, StoreState<E>>, ApiError> {
        let mut state = self.lock();
        *state.calls.entry(operation).or_default() += 1;
        if let Some(error) = state
            .failures
            .get_mut(&operation)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        Ok(state)
    }
}

impl<E> StoreState<E>
where
    E: Entity,
{
    fn position(&self, id: Id) -> Result<usize, ApiError> {
        self.records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| ApiError::not_found(format!("{} {} does not exist", E::NAME, id)))
    }
}

#[async_trait]
impl<E: Entity> Collaborator<E> for MemoryCollaborator<E> {
    async fn list(&self, query: &ListQuery) -> Result<Page<E>, ApiError> {
        let state = self.begin(Operation::List)?;
        Ok(paginate(&state.records, query))
    }

    async fn get(&self, id: Id) -> Result<E, ApiError> {
        let state = self.begin(Operation::Get)?;
        let index = state.position(id)?;
        Ok(state.records[index].clone())
    }

    async fn create(&self, payload: &Value) -> Result<E, ApiError> {
        let mut state = self.begin(Operation::Create)?;
        let mut record = payload_object(payload)?;

        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|e| ApiError::Internal(e.into()))?;
        record.insert("id".to_string(), Value::from(state.next_id));
        record
            .entry("isActive".to_string())
            .or_insert(Value::Bool(true));
        record
            .entry("createdAt".to_string())
            .or_insert(Value::String(created_at));

        let entity: E = decode(record)?;
        state.next_id += 1;
        state.records.push(entity.clone());
        Ok(entity)
    }

    async fn update(&self, id: Id, payload: &Value) -> Result<E, ApiError> {
        let mut state = self.begin(Operation::Update)?;
        let index = state.position(id)?;

        let mut record = match serde_json::to_value(&state.records[index]) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(ApiError::decode("record is not a JSON object")),
            Err(e) => return Err(ApiError::decode(e.to_string())),
        };
        for (key, value) in payload_object(payload)? {
            if key != "id" && key != "createdAt" {
                record.insert(key, value);
            }
        }

        let entity: E = decode(record)?;
        state.records[index] = entity.clone();
        Ok(entity)
    }

    async fn toggle_active(&self, id: Id) -> Result<E, ApiError> {
        let mut state = self.begin(Operation::ToggleActive)?;
        let index = state.position(id)?;
        let record = &mut state.records[index];
        let active = record
            .is_active()
            .ok_or_else(|| ApiError::bad_request(format!("{} cannot be toggled", E::NAME)))?;
        record.set_active(!active);
        Ok(record.clone())
    }

    async fn delete(&self, id: Id) -> Result<(), ApiError> {
        let mut state = self.begin(Operation::Delete)?;
        let index = state.position(id)?;
        let usage = state.records[index].usage_count();
        if usage > 0 {
            return Err(ApiError::conflict(
                Vec::new(),
                format!("{} {} is still used by {} records", E::NAME, id, usage),
            ));
        }
        state.records.remove(index);
        Ok(())
    }
}

/// Search, sort and slice an in-memory collection like the list endpoint does.
///
/// Search matches any top-level string field, case-insensitively.
pub fn paginate<E: Serialize + Clone>(records: &[E], query: &ListQuery) -> Page<E> {
    let needle = query.search.trim().to_lowercase();

    let mut rows: Vec<(Value, &E)> = records
        .iter()
        .filter_map(|record| serde_json::to_value(record).ok().map(|v| (v, record)))
        .filter(|(value, _)| needle.is_empty() || matches_search(value, &needle))
        .collect();

    let field = query.sort_field.as_str();
    rows.sort_by(|(a, _), (b, _)| {
        let ordering = compare_values(a.get(field), b.get(field));
        match query.sort_direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let total_items = rows.len() as u64;
    let size = query.size.max(1) as usize;
    let start = (query.page.max(1) as usize - 1) * size;
    let items = rows
        .into_iter()
        .skip(start)
        .take(size)
        .map(|(_, record)| record.clone())
        .collect();

    Page {
        items,
        total_items,
        total_pages: total_pages(total_items, query.size).max(1),
    }
}

fn matches_search(value: &Value, needle: &str) -> bool {
    value.as_object().is_some_and(|fields| {
        fields.values().any(|field| {
            field
                .as_str()
                .is_some_and(|text| text.to_lowercase().contains(needle))
        })
    })
}

/// Missing and null sort first; mismatched kinds compare by their JSON text.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn payload_object(payload: &Value) -> Result<Map<String, Value>, ApiError> {
    match payload {
        Value::Object(map) => Ok(map.clone()),
        _ => Err(ApiError::bad_request("payload must be a JSON object")),
    }
}

fn decode<E: Entity>(record: Map<String, Value>) -> Result<E, ApiError> {
    serde_json::from_value(Value::Object(record)).map_err(|e| {
        ApiError::validation(Vec::new(), format!("invalid {} payload: {}", E::NAME, e))
    })
}
