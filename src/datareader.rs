//! Sequential, column oriented reads over a sequence of instances.
//!
//! A [`DataReaderFactory`] fixes the columns of one type (its readable public properties
//! followed by its public fields by default) and emits their getters once. Each
//! [`DataReader`] it creates walks a row source forward only, exposing the current row by
//! column ordinal the way a database cursor does.
//!
//! # Examples
//!
//! ```rust
//! use dotreflect::{datareader::DataReaderFactory, metadata::value::{ObjectRef, Value}, Reflector};
//!
//! let reflector = Reflector::new();
//! let registry = reflector.registry();
//! let person = registry
//!     .class("Sample", "Person")
//!     .field("Age", registry.int32())
//!     .auto_property("Name", registry.string())
//!     .build()?;
//!
//! let ada = Value::Object(ObjectRef::allocate(&person));
//! reflector.setter(&person, "Name")?.set(&ada, "Ada")?;
//! reflector.setter(&person, "Age")?.set(&ada, 36)?;
//!
//! let factory = DataReaderFactory::new(&reflector, &person)?;
//! let mut reader = factory.create(vec![ada]);
//! assert_eq!(reader.name(0)?, "Name");
//! assert_eq!(reader.ordinal("Age")?, 1);
//!
//! assert!(reader.read());
//! assert_eq!(reader.get_value(0)?, Value::from("Ada"));
//! assert_eq!(reader.get_value(1)?, Value::I32(36));
//! assert!(!reader.read());
//! # Ok::<(), dotreflect::Error>(())
//! ```

use std::{collections::HashMap, sync::Arc};

use crate::{
    emit::MemberGetter,
    lookup,
    metadata::{
        flags::BindingFlags,
        members::MemberRef,
        typesystem::RuntimeTypeRc,
        value::Value,
    },
    Error, Reflector, Result,
};

/// Schema of one column
#[derive(Clone, Debug)]
pub struct Column {
    /// Position of the column
    pub ordinal: usize,
    /// Member name
    pub name: String,
    /// Declared type of the member
    pub value_type: RuntimeTypeRc,
    /// Returns true if the column can hold `Null`
    pub allow_null: bool,
    getter: MemberGetter,
}

struct Schema {
    element_type: RuntimeTypeRc,
    columns: Vec<Column>,
    ordinals: HashMap<String, usize>,
}

/// Creates [`DataReader`]s over instances of one type
#[derive(Clone)]
pub struct DataReaderFactory {
    schema: Arc<Schema>,
}

impl DataReaderFactory {
    /// Columns for the public instance properties and fields of `ty`
    ///
    /// # Errors
    /// Returns the first getter emission error.
    pub fn new(reflector: &Reflector, ty: &RuntimeTypeRc) -> Result<Self> {
        Self::with_flags(reflector, ty, BindingFlags::INSTANCE_PUBLIC)
    }

    /// Columns for the properties and fields of `ty` selected by `flags`, properties first
    ///
    /// # Errors
    /// Returns the first getter emission error.
    pub fn with_flags(reflector: &Reflector, ty: &RuntimeTypeRc, flags: BindingFlags) -> Result<Self> {
        let properties = lookup::properties(ty, flags).into_iter().map(MemberRef::Property);
        let fields = lookup::fields(ty, flags).into_iter().map(MemberRef::Field);
        let members = properties
            .chain(fields)
            .filter(MemberRef::can_read)
            .collect();
        Self::with_members(reflector, ty, members)
    }

    /// Columns for exactly `members`, in order
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for members that cannot be read through `ty`, and
    /// [`Error::AmbiguousMatch`] if two members share a name.
    pub fn with_members(reflector: &Reflector, ty: &RuntimeTypeRc, members: Vec<MemberRef>) -> Result<Self> {
        let mut columns = Vec::with_capacity(members.len());
        let mut ordinals = HashMap::with_capacity(members.len());
        for (ordinal, member) in members.iter().enumerate() {
            let value_type = member
                .value_type()
                .ok_or_else(|| malformed_error!("{} has no value type", member.name()))?;
            if ordinals.insert(member.name().to_string(), ordinal).is_some() {
                return Err(Error::AmbiguousMatch {
                    type_name: ty.fullname(),
                    name: member.name().to_string(),
                });
            }

            columns.push(Column {
                ordinal,
                name: member.name().to_string(),
                allow_null: !value_type.is_value_type(),
                value_type,
                getter: reflector.getter_for(ty, member)?,
            });
        }

        Ok(DataReaderFactory {
            schema: Arc::new(Schema {
                element_type: ty.clone(),
                columns,
                ordinals,
            }),
        })
    }

    /// The type the rows are instances of
    #[must_use]
    pub fn element_type(&self) -> &RuntimeTypeRc {
        &self.schema.element_type
    }

    /// The columns, by ordinal
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.schema.columns
    }

    /// Creates a reader positioned before the first of `rows`
    pub fn create<I>(&self, rows: I) -> DataReader<I::IntoIter>
    where
        I: IntoIterator<Item = Value>,
    {
        DataReader {
            schema: self.schema.clone(),
            rows: Some(rows.into_iter()),
            current: None,
            records: 0,
        }
    }
}

/// Forward only cursor over rows of a [`DataReaderFactory`] schema
pub struct DataReader<I> {
    schema: Arc<Schema>,
    rows: Option<I>,
    current: Option<Value>,
    records: usize,
}

impl<I: Iterator<Item = Value>> DataReader<I> {
    /// Advances to the next row; false once the rows are exhausted, after which the reader
    /// is closed
    pub fn read(&mut self) -> bool {
        match self.rows.as_mut().and_then(Iterator::next) {
            Some(row) => {
                self.current = Some(row);
                self.records += 1;
                true
            }
            None => {
                self.close();
                false
            }
        }
    }

    /// Releases the row source
    pub fn close(&mut self) {
        self.rows = None;
        self.current = None;
    }

    /// Returns true once the rows are exhausted or [`DataReader::close`] was called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.rows.is_none()
    }

    /// Number of rows read so far
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records
    }

    /// Number of columns
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.schema.columns.len()
    }

    /// The columns, by ordinal
    #[must_use]
    pub fn schema(&self) -> &[Column] {
        &self.schema.columns
    }

    /// Name of the column at `ordinal`
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] for an unknown ordinal.
    pub fn name(&self, ordinal: usize) -> Result<&str> {
        Ok(&self.column(ordinal)?.name)
    }

    /// Ordinal of the column `name`
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] for an unknown name.
    pub fn ordinal(&self, name: &str) -> Result<usize> {
        self.schema
            .ordinals
            .get(name)
            .copied()
            .ok_or_else(|| Error::MemberNotFound {
                type_name: self.schema.element_type.fullname(),
                name: name.to_string(),
            })
    }

    /// Declared type of the column at `ordinal`
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] for an unknown ordinal.
    pub fn field_type(&self, ordinal: usize) -> Result<&RuntimeTypeRc> {
        Ok(&self.column(ordinal)?.value_type)
    }

    /// Short type name of the column at `ordinal`, e.g. `Int32`
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] for an unknown ordinal.
    pub fn data_type_name(&self, ordinal: usize) -> Result<&str> {
        Ok(&self.column(ordinal)?.value_type.name)
    }

    /// Returns true if the column at `ordinal` can hold `Null`
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] for an unknown ordinal.
    pub fn is_nullable(&self, ordinal: usize) -> Result<bool> {
        Ok(self.column(ordinal)?.allow_null)
    }

    /// Value of the column at `ordinal` in the current row
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] for an unknown ordinal, [`Error::NullTarget`]
    /// without a current row, or the error of the getter.
    pub fn get_value(&self, ordinal: usize) -> Result<Value> {
        let column = self.column(ordinal)?;
        column.getter.get(self.current()?)
    }

    /// Value of the column `name` in the current row
    ///
    /// # Errors
    /// See [`DataReader::ordinal`] and [`DataReader::get_value`].
    pub fn get_value_by_name(&self, name: &str) -> Result<Value> {
        self.get_value(self.ordinal(name)?)
    }

    /// Copies the current row into `values`, at most one value per column, and returns the
    /// number of values written
    ///
    /// # Errors
    /// See [`DataReader::get_value`].
    pub fn get_values(&self, values: &mut [Value]) -> Result<usize> {
        let row = self.current()?;
        let count = values.len().min(self.schema.columns.len());
        for (slot, column) in values.iter_mut().zip(&self.schema.columns) {
            *slot = column.getter.get(row)?;
        }
        Ok(count)
    }

    /// Returns true if the column at `ordinal` is `Null` in the current row
    ///
    /// # Errors
    /// See [`DataReader::get_value`].
    pub fn is_null(&self, ordinal: usize) -> Result<bool> {
        Ok(self.get_value(ordinal)?.is_null())
    }

    fn column(&self, ordinal: usize) -> Result<&Column> {
        self.schema.columns.get(ordinal).ok_or(Error::IndexOutOfRange {
            index: ordinal,
            length: self.schema.columns.len(),
        })
    }

    fn current(&self) -> Result<&Value> {
        self.current
            .as_ref()
            .ok_or_else(|| Error::NullTarget("DataReader has no current row".to_string()))
    }
}
