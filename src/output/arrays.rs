//! JSON to Arrow conversion for passthrough columns
//!
//! Passthrough values keep their source shape, so their Arrow type is
//! inferred from the data: objects become structs, arrays become lists and
//! scalars map to their natural Arrow type.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, ListArray, NullArray, StringArray,
    StructArray,
};
use arrow::buffer::{NullBuffer, OffsetBuffer};
use arrow::datatypes::{DataType, Field, Fields};
use std::sync::Arc;

/// Build one Arrow array from a column of optional JSON values
pub fn json_array(values: &[Option<&JsonValue>]) -> Result<ArrayRef> {
    let data_type = settle(
        values
            .iter()
            .flatten()
            .map(|v| infer_type(v))
            .fold(DataType::Null, |acc, t| merge_types(&acc, &t)),
    );
    build_array(values, &data_type)
}

/// Infer the Arrow type of a single JSON value
fn infer_type(value: &JsonValue) -> DataType {
    match value {
        JsonValue::Null => DataType::Null,
        JsonValue::Bool(_) => DataType::Boolean,
        JsonValue::Number(n) if n.is_i64() => DataType::Int64,
        JsonValue::Number(_) => DataType::Float64,
        JsonValue::String(_) => DataType::Utf8,
        JsonValue::Array(items) => {
            let item = items
                .iter()
                .map(infer_type)
                .fold(DataType::Null, |acc, t| merge_types(&acc, &t));
            DataType::List(Arc::new(Field::new("item", item, true)))
        }
        JsonValue::Object(obj) => DataType::Struct(
            obj.iter()
                .map(|(k, v)| Field::new(k, infer_type(v), true))
                .collect::<Vec<_>>()
                .into(),
        ),
    }
}

/// Widen two types to one that holds values of both
fn merge_types(left: &DataType, right: &DataType) -> DataType {
    match (left, right) {
        (a, b) if a == b => a.clone(),

        (DataType::Null, other) | (other, DataType::Null) => other.clone(),

        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }

        (DataType::List(a), DataType::List(b)) => DataType::List(Arc::new(Field::new(
            "item",
            merge_types(a.data_type(), b.data_type()),
            true,
        ))),

        (DataType::Struct(a), DataType::Struct(b)) => {
            let mut fields: Vec<Field> = a.iter().map(|f| f.as_ref().clone()).collect();
            for field in b {
                match fields.iter_mut().find(|f| f.name() == field.name()) {
                    Some(existing) => {
                        let merged = merge_types(existing.data_type(), field.data_type());
                        *existing = Field::new(field.name(), merged, true);
                    }
                    None => fields.push(field.as_ref().clone()),
                }
            }
            DataType::Struct(fields.into())
        }

        // Anything else is kept as JSON text
        _ => DataType::Utf8,
    }
}

/// Replace types Parquet cannot store (field-less structs) with text
fn settle(data_type: DataType) -> DataType {
    match data_type {
        DataType::Struct(fields) if fields.is_empty() => DataType::Utf8,
        DataType::Struct(fields) => DataType::Struct(
            fields
                .iter()
                .map(|f| Field::new(f.name(), settle(f.data_type().clone()), true))
                .collect::<Vec<_>>()
                .into(),
        ),
        DataType::List(item) => DataType::List(Arc::new(Field::new(
            "item",
            settle(item.data_type().clone()),
            true,
        ))),
        other => other,
    }
}

fn build_array(values: &[Option<&JsonValue>], data_type: &DataType) -> Result<ArrayRef> {
    match data_type {
        DataType::Null => Ok(Arc::new(NullArray::new(values.len()))),

        DataType::Boolean => {
            let arr: BooleanArray = values.iter().map(|v| v.and_then(JsonValue::as_bool)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Int64 => {
            let arr: Int64Array = values.iter().map(|v| v.and_then(JsonValue::as_i64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Float64 => {
            let arr: Float64Array = values.iter().map(|v| v.and_then(JsonValue::as_f64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::List(field) => build_list_array(values, field),

        DataType::Struct(fields) => build_struct_array(values, fields),

        _ => {
            let arr: StringArray = values
                .iter()
                .map(|v| {
                    v.and_then(|v| match v {
                        JsonValue::Null => None,
                        JsonValue::String(s) => Some(s.clone()),
                        other => Some(other.to_string()),
                    })
                })
                .collect();
            Ok(Arc::new(arr))
        }
    }
}

fn validity<F>(values: &[Option<&JsonValue>], present: F) -> Option<NullBuffer>
where
    F: Fn(&JsonValue) -> bool,
{
    let bits: Vec<bool> = values.iter().map(|v| v.is_some_and(&present)).collect();
    bits.iter().any(|b| !b).then(|| NullBuffer::from(bits))
}

fn build_list_array(values: &[Option<&JsonValue>], field: &Arc<Field>) -> Result<ArrayRef> {
    let mut items: Vec<Option<&JsonValue>> = Vec::new();
    let mut offsets: Vec<i32> = Vec::with_capacity(values.len() + 1);
    offsets.push(0);

    for value in values {
        if let Some(JsonValue::Array(arr)) = value {
            items.extend(arr.iter().map(Some));
        }
        let offset = i32::try_from(items.len())
            .map_err(|_| Error::Other("List column too large for i32 offsets".to_string()))?;
        offsets.push(offset);
    }

    let child = build_array(&items, field.data_type())?;
    let nulls = validity(values, JsonValue::is_array);
    let list = ListArray::try_new(
        Arc::clone(field),
        OffsetBuffer::new(offsets.into()),
        child,
        nulls,
    )?;
    Ok(Arc::new(list))
}

fn build_struct_array(values: &[Option<&JsonValue>], fields: &Fields) -> Result<ArrayRef> {
    let children = fields
        .iter()
        .map(|field| {
            let child: Vec<Option<&JsonValue>> = values
                .iter()
                .map(|v| v.and_then(|v| v.get(field.name())))
                .collect();
            build_array(&child, field.data_type())
        })
        .collect::<Result<Vec<_>>>()?;

    let nulls = validity(values, JsonValue::is_object);
    let array = StructArray::try_new(fields.clone(), children, nulls)?;
    Ok(Arc::new(array))
}
