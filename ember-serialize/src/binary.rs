use std::collections::VecDeque;
use std::hash::Hash;

use bytemuck::{Pod, Zeroable};
use fnv::FnvHashMap;
use tracing::debug;

use ember_reflect::{
	meta_class_ifp, Atom, AtomDatabase, MetaClass, MetaProperty, Name, ObjectRef, ReflectType,
	Transaction, WString,
};

use crate::memory_reader::{MemoryViewReader, MemoryWriter, SeekOrigin};
use crate::SerializeError;


#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
	pub const fn new(tag: &[u8; 4]) -> FourCC {
		FourCC(*tag)
	}
}

impl std::fmt::Display for FourCC {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(&String::from_utf8_lossy(&self.0))
	}
}

const FILE_MAGIC: FourCC = FourCC::new(b"BINA");
const FILE_VERSION: FourCC = FourCC::new(b"1.00");

const SECTION_NAMES: FourCC = FourCC::new(b"#NME");
const SECTION_STRINGS: FourCC = FourCC::new(b"#STR");
const SECTION_WSTRINGS: FourCC = FourCC::new(b"#WST");
const SECTION_CLASSES: FourCC = FourCC::new(b"#CLS");
const SECTION_PROPERTIES: FourCC = FourCC::new(b"#PRP");
const SECTION_TOP_OBJECTS: FourCC = FourCC::new(b"#TOP");
const SECTION_EXPORTS: FourCC = FourCC::new(b"#EXP");
const SECTION_OBJECT_HEADERS: FourCC = FourCC::new(b"#OBH");
const SECTION_OBJECT_DATA: FourCC = FourCC::new(b"#OBD");
const SECTION_END: FourCC = FourCC::new(b"#END");

const TAG_OBJECT_EXPORT: FourCC = FourCC::new(b"OEXP");
const TAG_OBJECT_IMPORT: FourCC = FourCC::new(b"OIMP");
const TAG_OBJECT_PRIVATE: FourCC = FourCC::new(b"OPRI");
const TAG_OBJECT_NULL: FourCC = FourCC::new(b"ONUL");
const TAG_OBJECT_START: FourCC = FourCC::new(b"OSTA");
const TAG_OBJECT_METACLASS: FourCC = FourCC::new(b"OMTC");
const TAG_OBJECT_END: FourCC = FourCC::new(b"OEND");

const TAG_ATOM_SCALAR: FourCC = FourCC::new(b"ASCR");
const TAG_ATOM_PAIR: FourCC = FourCC::new(b"APAR");
const TAG_ATOM_VECTOR: FourCC = FourCC::new(b"AVEC");
const TAG_ATOM_DICTIONARY: FourCC = FourCC::new(b"ADIC");
const TAG_ATOM_ATOM: FourCC = FourCC::new(b"ATOM");
const TAG_ATOM_NULL: FourCC = FourCC::new(b"ANUL");

const INVALID_INDEX: u32 = u32::MAX;


#[derive(Debug, Copy, Clone)]
struct ObjectHeader {
	kind: FourCC,
	class_index: u32,
	name_index: u32,
	data_offset: u32,
}

/// Insertion-ordered deduplication table: first sighting assigns the next
/// small integer index.
struct Indexer<K> {
	map: FnvHashMap<K, u32>,
	order: Vec<K>,
}

impl<K: Eq + Hash + Clone> Indexer<K> {
	fn new() -> Indexer<K> {
		Indexer { map: FnvHashMap::default(), order: Vec::new() }
	}

	fn len(&self) -> usize {
		self.order.len()
	}

	/// Returns `(index, first_sighting)`.
	fn index_of(&mut self, key: &K) -> (u32, bool) {
		if let Some(&index) = self.map.get(key) {
			return (index, false);
		}

		let index = self.order.len() as u32;
		self.map.insert(key.clone(), index);
		self.order.push(key.clone());
		(index, true)
	}

	fn entries(&self) -> &[K] {
		&self.order
	}
}


/// Reflection-driven binary encoder/decoder for object transactions.
///
/// The encoder walks the transaction breadth first, deduplicating names,
/// strings, classes, properties and objects into indexed tables, and
/// frames each object body with back-patched metaclass and property
/// counts, eliding default-valued properties and empty metaclass frames.
#[derive(Debug, Default)]
pub struct BinarySerializer;

impl BinarySerializer {
	pub fn new() -> BinarySerializer {
		BinarySerializer
	}

	pub fn serialize(&self, transaction: &Transaction) -> Result<Vec<u8>, SerializeError> {
		let mut state = WriteState::new(transaction);

		for object in transaction.iter() {
			let index = state.add_object(Some(object));
			state.top_objects.push(index);
		}

		state.process_queue()?;
		Ok(state.finalize())
	}

	/// Decodes `input` and appends the top-level objects to `transaction`.
	/// Imported object names resolve against `imports`. Any structural
	/// failure aborts with no objects committed.
	pub fn deserialize(
		&self,
		transaction: &mut Transaction,
		input: &[u8],
		imports: &AtomDatabase,
	) -> Result<(), SerializeError> {
		if input.is_empty() {
			return Ok(());
		}

		let mut reader = MemoryViewReader::new(input);
		let mut state = ReadState::new(imports);
		state.read(&mut reader)?;
		state.finalize(transaction)
	}
}


// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

struct WriteState<'t> {
	transaction: &'t Transaction,

	names: Indexer<Name>,
	strings: Indexer<String>,
	wstrings: Indexer<WString>,

	classes: Indexer<usize>,
	class_order: Vec<&'static MetaClass>,
	properties_by_class: Vec<Indexer<&'static str>>,

	objects: Indexer<usize>,
	object_queue: VecDeque<Option<ObjectRef>>,
	headers: Vec<ObjectHeader>,
	top_objects: Vec<u32>,

	names_to_export: FnvHashMap<u32, u32>,
	names_to_import: FnvHashMap<u32, u32>,

	object_stream: MemoryWriter,
}

impl<'t> WriteState<'t> {
	fn new(transaction: &'t Transaction) -> WriteState<'t> {
		WriteState {
			transaction,
			names: Indexer::new(),
			strings: Indexer::new(),
			wstrings: Indexer::new(),
			classes: Indexer::new(),
			class_order: Vec::new(),
			properties_by_class: Vec::new(),
			objects: Indexer::new(),
			object_queue: VecDeque::new(),
			headers: Vec::new(),
			top_objects: Vec::new(),
			names_to_export: FnvHashMap::default(),
			names_to_import: FnvHashMap::default(),
			object_stream: MemoryWriter::new(),
		}
	}

	fn add_class(&mut self, class: &'static MetaClass) -> u32 {
		let key = class as *const MetaClass as usize;
		let (index, first_sighting) = self.classes.index_of(&key);

		if first_sighting {
			self.class_order.push(class);
			self.properties_by_class.push(Indexer::new());
			debug_assert!(self.class_order.len() == self.classes.len());
		}

		index
	}

	/// Queues an object for streaming and returns its stable index. `None`
	/// dedups to the single null-object slot.
	fn add_object(&mut self, object: Option<&ObjectRef>) -> u32 {
		let key = object.map_or(0, ember_reflect::object_identity);
		let (index, first_sighting) = self.objects.index_of(&key);

		if first_sighting {
			self.object_queue.push_back(object.cloned());
		}

		index
	}

	fn process_queue(&mut self) -> Result<(), SerializeError> {
		while let Some(object) = self.object_queue.pop_front() {
			// FIFO order matches index assignment order
			let index = self.headers.len() as u32;

			let header = match object {
				None => ObjectHeader {
					kind: TAG_OBJECT_NULL,
					class_index: INVALID_INDEX,
					name_index: INVALID_INDEX,
					data_offset: INVALID_INDEX,
				},
				Some(object) => self.stream_object(index, &object)?,
			};

			self.headers.push(header);
		}

		Ok(())
	}

	fn stream_object(
		&mut self,
		index: u32,
		object: &ObjectRef,
	) -> Result<ObjectHeader, SerializeError> {
		let meta_class = object.borrow().meta_class();
		let class_index = self.add_class(meta_class);

		let exported_name = object.borrow().object_name().cloned();
		let mut name_index = INVALID_INDEX;
		let kind;

		if let Some(name) = exported_name {
			assert!(!name.is_empty());
			name_index = self.names.index_of(&name).0;

			if self.transaction.contains(object) {
				kind = TAG_OBJECT_EXPORT;
				assert!(!self.names_to_import.contains_key(&name_index));
				let previous = self.names_to_export.insert(name_index, index);
				assert!(previous.is_none(), "duplicate exported name '{name}'");
			} else {
				// Foreign exported objects are referenced by name only
				kind = TAG_OBJECT_IMPORT;
				assert!(!self.names_to_export.contains_key(&name_index));
				self.names_to_import.insert(name_index, index);

				return Ok(ObjectHeader {
					kind,
					class_index,
					name_index,
					data_offset: INVALID_INDEX,
				});
			}
		} else {
			kind = TAG_OBJECT_PRIVATE;
		}

		let data_offset = self.write_object_body(object)?;

		Ok(ObjectHeader { kind, class_index, name_index, data_offset })
	}

	fn write_object_body(&mut self, object: &ObjectRef) -> Result<u32, SerializeError> {
		let data_offset = self.object_stream.len() as u32;
		self.object_stream.write_pod(TAG_OBJECT_START);

		let metaclass_count_offset = self.object_stream.len();
		self.object_stream.write_pod(0u32);
		let mut metaclass_count = 0u32;

		let borrowed = object.borrow();

		// Most-derived first; frames without a single non-default property
		// are erased again.
		for class in borrowed.meta_class().chain() {
			let frame_start = self.object_stream.len();
			self.object_stream.write_pod(TAG_OBJECT_METACLASS);

			let class_index = self.add_class(class);
			self.object_stream.write_pod(class_index);

			let property_count_offset = self.object_stream.len();
			self.object_stream.write_pod(0u32);
			let mut property_count = 0u32;

			for property in class.properties() {
				if property.is_default_value(&*borrowed) {
					continue;
				}

				property_count += 1;

				let property_index =
					self.properties_by_class[class_index as usize].index_of(&property.name()).0;
				self.object_stream.write_pod(property_index);

				let atom = property.wrap_copy(&*borrowed);
				self.write_atom(&atom)?;
			}

			if property_count > 0 {
				metaclass_count += 1;
				self.object_stream.patch_pod(property_count_offset, property_count);
			} else {
				self.object_stream.truncate(frame_start);
			}
		}

		self.object_stream.patch_pod(metaclass_count_offset, metaclass_count);
		self.object_stream.write_pod(TAG_OBJECT_END);

		Ok(data_offset)
	}

	fn write_atom(&mut self, atom: &Atom) -> Result<(), SerializeError> {
		match atom {
			Atom::Null => self.object_stream.write_pod(TAG_ATOM_NULL),

			Atom::Pair(first, second) => {
				self.object_stream.write_pod(TAG_ATOM_PAIR);
				self.object_stream.write_pod(atom.type_id());
				self.write_atom(first)?;
				self.write_atom(second)?;
			}

			Atom::Vector(_, items) => {
				self.object_stream.write_pod(TAG_ATOM_VECTOR);
				self.object_stream.write_pod(atom.type_id());
				self.object_stream.write_pod(items.len() as u32);
				for item in items {
					self.write_atom(item)?;
				}
			}

			Atom::Dictionary(_, _, items) => {
				self.object_stream.write_pod(TAG_ATOM_DICTIONARY);
				self.object_stream.write_pod(atom.type_id());
				self.object_stream.write_pod(items.len() as u32);
				for (key, value) in items {
					self.write_atom(key)?;
					self.write_atom(value)?;
				}
			}

			Atom::Atom(inner) => {
				let inner_id = inner.type_id();
				if ReflectType::from_scalar_type_id(inner_id).is_none() {
					return Err(SerializeError::UnsupportedAtom(inner_id));
				}

				self.object_stream.write_pod(TAG_ATOM_ATOM);
				self.object_stream.write_pod(inner_id);
				self.write_atom(inner)?;
			}

			_ => {
				self.object_stream.write_pod(TAG_ATOM_SCALAR);
				self.object_stream.write_pod(atom.type_id());
				self.write_scalar_value(atom);
			}
		}

		Ok(())
	}

	fn write_scalar_value(&mut self, atom: &Atom) {
		match atom {
			Atom::Bool(v) => self.object_stream.write_pod(*v as u8),
			Atom::I8(v) => self.object_stream.write_pod(*v),
			Atom::U8(v) => self.object_stream.write_pod(*v),
			Atom::I16(v) => self.object_stream.write_pod(*v),
			Atom::U16(v) => self.object_stream.write_pod(*v),
			Atom::I32(v) => self.object_stream.write_pod(*v),
			Atom::U32(v) => self.object_stream.write_pod(*v),
			Atom::I64(v) => self.object_stream.write_pod(*v),
			Atom::U64(v) => self.object_stream.write_pod(*v),
			Atom::F32(v) => self.object_stream.write_pod(*v),
			Atom::F64(v) => self.object_stream.write_pod(*v),

			Atom::Str(v) => {
				let index = self.strings.index_of(v).0;
				self.object_stream.write_pod(index);
			}
			Atom::WStr(v) => {
				let index = self.wstrings.index_of(v).0;
				self.object_stream.write_pod(index);
			}
			Atom::Name(v) => {
				let index = self.names.index_of(v).0;
				self.object_stream.write_pod(index);
			}

			Atom::Float2(v) => self.object_stream.write_pod(v.to_array()),
			Atom::Float3(v) => self.object_stream.write_pod(v.to_array()),
			Atom::Float4(v) => self.object_stream.write_pod(v.to_array()),
			Atom::Float3x3(v) => self.object_stream.write_pod(v.to_cols_array()),
			Atom::Float4x4(v) => self.object_stream.write_pod(v.to_cols_array()),

			Atom::Object(object) => match object {
				None => self.object_stream.write_pod(TAG_OBJECT_NULL),
				Some(object) => {
					let index = self.add_object(Some(object));
					self.object_stream.write_pod(index);
				}
			},

			Atom::Null | Atom::Pair(..) | Atom::Vector(..) | Atom::Dictionary(..) | Atom::Atom(_) => {
				unreachable!("not a scalar atom")
			}
		}
	}

	fn finalize(self) -> Vec<u8> {
		let mut writer = MemoryWriter::new();

		writer.write_pod(FILE_MAGIC);
		writer.write_pod(FILE_VERSION);

		debug!(
			names = self.names.len(),
			strings = self.strings.len(),
			classes = self.classes.len(),
			objects = self.headers.len(),
			"serializing transaction"
		);

		writer.write_pod(SECTION_NAMES);
		writer.write_pod(self.names.len() as u32);
		for name in self.names.entries() {
			write_str(&mut writer, name.as_str());
		}

		writer.write_pod(SECTION_STRINGS);
		writer.write_pod(self.strings.len() as u32);
		for string in self.strings.entries() {
			write_str(&mut writer, string);
		}

		writer.write_pod(SECTION_WSTRINGS);
		writer.write_pod(self.wstrings.len() as u32);
		for wstring in self.wstrings.entries() {
			writer.write_pod(wstring.0.len() as u32);
			for unit in &wstring.0 {
				writer.write_pod(*unit);
			}
		}

		writer.write_pod(SECTION_CLASSES);
		writer.write_pod(self.class_order.len() as u32);
		for class in &self.class_order {
			write_str(&mut writer, class.name());
		}

		writer.write_pod(SECTION_PROPERTIES);
		for properties in &self.properties_by_class {
			writer.write_pod(properties.len() as u32);
			for property_name in properties.entries() {
				write_str(&mut writer, property_name);
			}
		}

		writer.write_pod(SECTION_TOP_OBJECTS);
		writer.write_pod(self.top_objects.len() as u32);
		for index in &self.top_objects {
			writer.write_pod(*index);
		}

		writer.write_pod(SECTION_EXPORTS);
		let mut exports: Vec<(u32, u32)> = self.names_to_export.into_iter().collect();
		exports.sort_unstable_by_key(|(name_index, _)| *name_index);
		writer.write_pod(exports.len() as u32);
		for (name_index, object_index) in exports {
			writer.write_pod(name_index);
			writer.write_pod(object_index);
		}

		writer.write_pod(SECTION_OBJECT_HEADERS);
		writer.write_pod(self.headers.len() as u32);
		for header in &self.headers {
			writer.write_pod(header.kind);
			writer.write_pod(header.class_index);
			writer.write_pod(header.name_index);
			writer.write_pod(header.data_offset);
		}

		writer.write_pod(SECTION_OBJECT_DATA);
		writer.write_pod(self.object_stream.len() as u64);
		writer.write_bytes(self.object_stream.bytes());

		writer.write_pod(SECTION_END);
		writer.into_bytes()
	}
}

fn write_str(writer: &mut MemoryWriter, s: &str) {
	writer.write_pod(s.len() as u32);
	writer.write_bytes(s.as_bytes());
}


// ---------------------------------------------------------------------------
// Deserialization
// ---------------------------------------------------------------------------

struct ReadState<'a> {
	imports: &'a AtomDatabase,

	names: Vec<Name>,
	strings: Vec<String>,
	wstrings: Vec<WString>,
	classes: Vec<&'static MetaClass>,
	properties: Vec<Vec<&'static MetaProperty>>,
	top_objects: Vec<u32>,
	exports: Vec<(u32, u32)>,
	headers: Vec<ObjectHeader>,
	objects: Vec<Option<ObjectRef>>,
}

impl<'a> ReadState<'a> {
	fn new(imports: &'a AtomDatabase) -> ReadState<'a> {
		ReadState {
			imports,
			names: Vec::new(),
			strings: Vec::new(),
			wstrings: Vec::new(),
			classes: Vec::new(),
			properties: Vec::new(),
			top_objects: Vec::new(),
			exports: Vec::new(),
			headers: Vec::new(),
			objects: Vec::new(),
		}
	}

	fn read(&mut self, reader: &mut MemoryViewReader<'_>) -> Result<(), SerializeError> {
		if !reader.expect_pod(&FILE_MAGIC) {
			return Err(SerializeError::InvalidMagic);
		}
		if !reader.expect_pod(&FILE_VERSION) {
			return Err(SerializeError::UnsupportedVersion);
		}

		if !reader.expect_pod(&SECTION_NAMES) {
			return Err(SerializeError::InvalidSection("names"));
		}
		self.names = read_str_table(reader, "names")?
			.into_iter()
			.map(|s| Name::from(s))
			.collect();

		if !reader.expect_pod(&SECTION_STRINGS) {
			return Err(SerializeError::InvalidSection("strings"));
		}
		self.strings = read_str_table(reader, "strings")?;

		if !reader.expect_pod(&SECTION_WSTRINGS) {
			return Err(SerializeError::InvalidSection("wstrings"));
		}
		self.wstrings = read_wstr_table(reader)?;

		if !reader.expect_pod(&SECTION_CLASSES) {
			return Err(SerializeError::InvalidSection("classes"));
		}
		for class_name in read_str_table(reader, "classes")? {
			let class = meta_class_ifp(&class_name)
				.ok_or(SerializeError::UnknownClass(class_name))?;
			self.classes.push(class);
		}

		if !reader.expect_pod(&SECTION_PROPERTIES) {
			return Err(SerializeError::InvalidSection("properties"));
		}
		for class in &self.classes {
			let mut properties = Vec::new();
			for property_name in read_str_table(reader, "properties")? {
				let property = class.property_ifp(&property_name).ok_or_else(|| {
					SerializeError::UnknownProperty {
						class: class.name().to_owned(),
						property: property_name,
					}
				})?;
				properties.push(property);
			}
			self.properties.push(properties);
		}

		if !reader.expect_pod(&SECTION_TOP_OBJECTS) {
			return Err(SerializeError::InvalidSection("top objects"));
		}
		self.top_objects = read_pod_table::<u32>(reader, "top objects")?;

		if !reader.expect_pod(&SECTION_EXPORTS) {
			return Err(SerializeError::InvalidSection("exports"));
		}
		let raw_exports = read_pod_table::<[u32; 2]>(reader, "exports")?;
		self.exports = raw_exports.into_iter().map(|[name, object]| (name, object)).collect();

		if !reader.expect_pod(&SECTION_OBJECT_HEADERS) {
			return Err(SerializeError::InvalidSection("object headers"));
		}
		let header_count = reader
			.read_pod::<u32>()
			.ok_or(SerializeError::ShortRead("object headers"))? as usize;
		for _ in 0..header_count {
			let kind = reader
				.read_pod::<FourCC>()
				.ok_or(SerializeError::ShortRead("object headers"))?;
			let class_index = reader
				.read_pod::<u32>()
				.ok_or(SerializeError::ShortRead("object headers"))?;
			let name_index = reader
				.read_pod::<u32>()
				.ok_or(SerializeError::ShortRead("object headers"))?;
			let data_offset = reader
				.read_pod::<u32>()
				.ok_or(SerializeError::ShortRead("object headers"))?;
			self.headers.push(ObjectHeader { kind, class_index, name_index, data_offset });
		}

		debug!(
			classes = self.classes.len(),
			objects = self.headers.len(),
			"deserializing transaction"
		);

		// First pass: construct or import every object header-first
		for index in 0..self.headers.len() {
			let header = self.headers[index];
			let object = self.create_object_from_header(&header)?;
			self.objects.push(object);
		}

		if !reader.expect_pod(&SECTION_OBJECT_DATA) {
			return Err(SerializeError::InvalidSection("object data"));
		}
		let data_size = reader
			.read_pod::<u64>()
			.ok_or(SerializeError::ShortRead("object data"))? as usize;
		let data_begin = reader.tell();
		if reader.remaining() < data_size {
			return Err(SerializeError::ShortRead("object data"));
		}

		// Second pass: fill in every streamed body
		let mut data_reader = reader.sub_range(data_begin, data_size);
		for (index, header) in self.headers.iter().enumerate() {
			if header.kind == TAG_OBJECT_NULL || header.kind == TAG_OBJECT_IMPORT {
				continue;
			}

			if header.data_offset as usize != data_reader.tell() {
				return Err(SerializeError::InvalidObjectHeader);
			}

			let object = self.objects[index].clone().expect("streamed object");
			self.read_object_body(&mut data_reader, &object)?;
		}

		if !data_reader.is_eof() {
			return Err(SerializeError::TrailingData);
		}

		let seeked = reader.seek((data_begin + data_size) as i64, SeekOrigin::Begin);
		debug_assert!(seeked);
		if !reader.expect_pod(&SECTION_END) {
			return Err(SerializeError::InvalidSection("end"));
		}

		Ok(())
	}

	fn create_object_from_header(
		&self,
		header: &ObjectHeader,
	) -> Result<Option<ObjectRef>, SerializeError> {
		if header.kind == TAG_OBJECT_NULL {
			if header.class_index != INVALID_INDEX
				|| header.name_index != INVALID_INDEX
				|| header.data_offset != INVALID_INDEX
			{
				return Err(SerializeError::InvalidObjectHeader);
			}
			return Ok(None);
		}

		let class = *self
			.classes
			.get(header.class_index as usize)
			.ok_or(SerializeError::InvalidIndex("class"))?;

		if header.kind == TAG_OBJECT_PRIVATE {
			if header.name_index != INVALID_INDEX {
				return Err(SerializeError::InvalidObjectHeader);
			}
			return Ok(Some(class.create_instance()));
		}

		let name = self
			.names
			.get(header.name_index as usize)
			.ok_or(SerializeError::InvalidIndex("name"))?;

		if header.kind == TAG_OBJECT_EXPORT {
			Ok(Some(class.create_instance()))
		} else if header.kind == TAG_OBJECT_IMPORT {
			let object = self
				.imports
				.get_ifp(name)
				.ok_or_else(|| SerializeError::ImportNotFound(name.as_str().to_owned()))?;
			Ok(Some(object.clone()))
		} else {
			Err(SerializeError::InvalidObjectHeader)
		}
	}

	fn read_object_body(
		&self,
		reader: &mut MemoryViewReader<'_>,
		object: &ObjectRef,
	) -> Result<(), SerializeError> {
		if !reader.expect_pod(&TAG_OBJECT_START) {
			return Err(SerializeError::UnexpectedTag("object start"));
		}

		let metaclass_count = reader
			.read_pod::<u32>()
			.ok_or(SerializeError::ShortRead("object body"))?;

		for _ in 0..metaclass_count {
			if !reader.expect_pod(&TAG_OBJECT_METACLASS) {
				return Err(SerializeError::UnexpectedTag("metaclass frame"));
			}

			let class_index = reader
				.read_pod::<u32>()
				.ok_or(SerializeError::ShortRead("metaclass frame"))? as usize;
			let property_count = reader
				.read_pod::<u32>()
				.ok_or(SerializeError::ShortRead("metaclass frame"))?;

			if class_index >= self.classes.len() {
				return Err(SerializeError::InvalidIndex("class"));
			}
			if property_count == 0 {
				return Err(SerializeError::InvalidObjectHeader);
			}

			let properties = &self.properties[class_index];

			for _ in 0..property_count {
				let property_index = reader
					.read_pod::<u32>()
					.ok_or(SerializeError::ShortRead("property"))? as usize;

				let property = *properties
					.get(property_index)
					.ok_or(SerializeError::InvalidIndex("property"))?;

				let atom = self.read_atom(reader, property.reflect_type())?;
				property.unwrap_move(&mut *object.borrow_mut(), atom);
			}
		}

		if !reader.expect_pod(&TAG_OBJECT_END) {
			return Err(SerializeError::UnexpectedTag("object end"));
		}

		Ok(())
	}

	fn read_atom(
		&self,
		reader: &mut MemoryViewReader<'_>,
		ty: &ReflectType,
	) -> Result<Atom, SerializeError> {
		match ty {
			ReflectType::Pair(children) => {
				if !reader.expect_pod(&TAG_ATOM_PAIR) {
					return Err(SerializeError::UnexpectedTag("pair"));
				}
				if !reader.expect_pod(&ty.type_id()) {
					return Err(SerializeError::TypeIdMismatch("pair"));
				}

				let first = self.read_atom(reader, &children.0)?;
				let second = self.read_atom(reader, &children.1)?;
				Ok(Atom::Pair(Box::new(first), Box::new(second)))
			}

			ReflectType::Vector(element) => {
				if !reader.expect_pod(&TAG_ATOM_VECTOR) {
					return Err(SerializeError::UnexpectedTag("vector"));
				}
				if !reader.expect_pod(&ty.type_id()) {
					return Err(SerializeError::TypeIdMismatch("vector"));
				}

				let count = reader
					.read_pod::<u32>()
					.ok_or(SerializeError::ShortRead("vector"))?;

				let mut items = Vec::with_capacity(count.min(0xFFFF) as usize);
				for _ in 0..count {
					items.push(self.read_atom(reader, element)?);
				}
				Ok(Atom::Vector((**element).clone(), items))
			}

			ReflectType::Dictionary(children) => {
				if !reader.expect_pod(&TAG_ATOM_DICTIONARY) {
					return Err(SerializeError::UnexpectedTag("dictionary"));
				}
				if !reader.expect_pod(&ty.type_id()) {
					return Err(SerializeError::TypeIdMismatch("dictionary"));
				}

				let count = reader
					.read_pod::<u32>()
					.ok_or(SerializeError::ShortRead("dictionary"))?;

				let mut items = Vec::with_capacity(count.min(0xFFFF) as usize);
				for _ in 0..count {
					let key = self.read_atom(reader, &children.0)?;
					let value = self.read_atom(reader, &children.1)?;
					items.push((key, value));
				}
				Ok(Atom::Dictionary(children.0.clone(), children.1.clone(), items))
			}

			ReflectType::Atom => {
				if reader.expect_pod(&TAG_ATOM_ATOM) {
					let inner_id = reader
						.read_pod::<u32>()
						.ok_or(SerializeError::ShortRead("atom"))?;
					let inner_ty = ReflectType::from_scalar_type_id(inner_id)
						.ok_or(SerializeError::UnsupportedAtom(inner_id))?;
					let inner = self.read_atom(reader, &inner_ty)?;
					Ok(Atom::Atom(Box::new(inner)))
				} else if reader.expect_pod(&TAG_ATOM_NULL) {
					Ok(Atom::Null)
				} else {
					Err(SerializeError::UnexpectedTag("atom"))
				}
			}

			_ => {
				if !reader.expect_pod(&TAG_ATOM_SCALAR) {
					return Err(SerializeError::UnexpectedTag("scalar"));
				}
				if !reader.expect_pod(&ty.type_id()) {
					return Err(SerializeError::TypeIdMismatch("scalar"));
				}

				self.read_scalar_value(reader, ty)
			}
		}
	}

	fn read_scalar_value(
		&self,
		reader: &mut MemoryViewReader<'_>,
		ty: &ReflectType,
	) -> Result<Atom, SerializeError> {
		let short = || SerializeError::ShortRead("scalar");

		Ok(match ty {
			ReflectType::Bool => Atom::Bool(reader.read_pod::<u8>().ok_or_else(short)? != 0),
			ReflectType::I8 => Atom::I8(reader.read_pod().ok_or_else(short)?),
			ReflectType::U8 => Atom::U8(reader.read_pod().ok_or_else(short)?),
			ReflectType::I16 => Atom::I16(reader.read_pod().ok_or_else(short)?),
			ReflectType::U16 => Atom::U16(reader.read_pod().ok_or_else(short)?),
			ReflectType::I32 => Atom::I32(reader.read_pod().ok_or_else(short)?),
			ReflectType::U32 => Atom::U32(reader.read_pod().ok_or_else(short)?),
			ReflectType::I64 => Atom::I64(reader.read_pod().ok_or_else(short)?),
			ReflectType::U64 => Atom::U64(reader.read_pod().ok_or_else(short)?),
			ReflectType::F32 => Atom::F32(reader.read_pod().ok_or_else(short)?),
			ReflectType::F64 => Atom::F64(reader.read_pod().ok_or_else(short)?),

			ReflectType::Str => {
				let index = reader.read_pod::<u32>().ok_or_else(short)? as usize;
				let string = self
					.strings
					.get(index)
					.ok_or(SerializeError::InvalidIndex("string"))?;
				Atom::Str(string.clone())
			}
			ReflectType::WStr => {
				let index = reader.read_pod::<u32>().ok_or_else(short)? as usize;
				let wstring = self
					.wstrings
					.get(index)
					.ok_or(SerializeError::InvalidIndex("wstring"))?;
				Atom::WStr(wstring.clone())
			}
			ReflectType::Name => {
				let index = reader.read_pod::<u32>().ok_or_else(short)? as usize;
				let name = self
					.names
					.get(index)
					.ok_or(SerializeError::InvalidIndex("name"))?;
				Atom::Name(name.clone())
			}

			ReflectType::Float2 => {
				Atom::Float2(glam::Vec2::from_array(reader.read_pod::<[f32; 2]>().ok_or_else(short)?))
			}
			ReflectType::Float3 => {
				Atom::Float3(glam::Vec3::from_array(reader.read_pod::<[f32; 3]>().ok_or_else(short)?))
			}
			ReflectType::Float4 => {
				Atom::Float4(glam::Vec4::from_array(reader.read_pod::<[f32; 4]>().ok_or_else(short)?))
			}
			ReflectType::Float3x3 => Atom::Float3x3(glam::Mat3::from_cols_array(
				&reader.read_pod::<[f32; 9]>().ok_or_else(short)?,
			)),
			ReflectType::Float4x4 => Atom::Float4x4(glam::Mat4::from_cols_array(
				&reader.read_pod::<[f32; 16]>().ok_or_else(short)?,
			)),

			ReflectType::Object => {
				if reader.expect_pod(&TAG_OBJECT_NULL) {
					Atom::Object(None)
				} else {
					let index = reader.read_pod::<u32>().ok_or_else(short)? as usize;
					let object = self
						.objects
						.get(index)
						.ok_or(SerializeError::InvalidIndex("object"))?;
					Atom::Object(object.clone())
				}
			}

			ReflectType::Pair(_)
			| ReflectType::Vector(_)
			| ReflectType::Dictionary(_)
			| ReflectType::Atom => unreachable!("not a scalar type"),
		})
	}

	fn finalize(self, transaction: &mut Transaction) -> Result<(), SerializeError> {
		// Hand exported names back to their objects
		for (name_index, object_index) in &self.exports {
			let name = self
				.names
				.get(*name_index as usize)
				.ok_or(SerializeError::InvalidIndex("name"))?;
			let object = self
				.objects
				.get(*object_index as usize)
				.and_then(Option::as_ref)
				.ok_or(SerializeError::InvalidIndex("object"))?;

			object.borrow_mut().set_object_name(name.clone());
		}

		for index in &self.top_objects {
			let object = self
				.objects
				.get(*index as usize)
				.and_then(Option::as_ref)
				.ok_or(SerializeError::InvalidIndex("top object"))?;

			transaction.add(object.clone());
		}

		Ok(())
	}
}

fn read_str_table(
	reader: &mut MemoryViewReader<'_>,
	section: &'static str,
) -> Result<Vec<String>, SerializeError> {
	let count = reader
		.read_pod::<u32>()
		.ok_or(SerializeError::ShortRead(section))?;

	let mut entries = Vec::with_capacity(count.min(0xFFFF) as usize);
	for _ in 0..count {
		let length = reader
			.read_pod::<u32>()
			.ok_or(SerializeError::ShortRead(section))? as usize;
		let bytes = reader
			.eat_ifp(length)
			.ok_or(SerializeError::ShortRead(section))?;
		let string =
			String::from_utf8(bytes.to_vec()).map_err(|_| SerializeError::InvalidString)?;
		entries.push(string);
	}

	Ok(entries)
}

fn read_wstr_table(reader: &mut MemoryViewReader<'_>) -> Result<Vec<WString>, SerializeError> {
	let count = reader
		.read_pod::<u32>()
		.ok_or(SerializeError::ShortRead("wstrings"))?;

	let mut entries = Vec::with_capacity(count.min(0xFFFF) as usize);
	for _ in 0..count {
		let length = reader
			.read_pod::<u32>()
			.ok_or(SerializeError::ShortRead("wstrings"))? as usize;
		let bytes = reader
			.eat_ifp(length * 2)
			.ok_or(SerializeError::ShortRead("wstrings"))?;

		let units = bytes
			.chunks_exact(2)
			.map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
			.collect();
		entries.push(WString(units));
	}

	Ok(entries)
}

fn read_pod_table<T: Pod>(
	reader: &mut MemoryViewReader<'_>,
	section: &'static str,
) -> Result<Vec<T>, SerializeError> {
	let count = reader
		.read_pod::<u32>()
		.ok_or(SerializeError::ShortRead(section))?;

	let mut entries = Vec::with_capacity(count.min(0xFFFF) as usize);
	for _ in 0..count {
		entries.push(reader.read_pod::<T>().ok_or(SerializeError::ShortRead(section))?);
	}

	Ok(entries)
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_input_deserializes_to_nothing() {
		let serializer = BinarySerializer::new();
		let mut transaction = Transaction::new();
		let imports = AtomDatabase::new();

		serializer.deserialize(&mut transaction, &[], &imports).unwrap();
		assert!(transaction.is_empty());
	}

	#[test]
	fn empty_transaction_round_trips() {
		let serializer = BinarySerializer::new();
		let bytes = serializer.serialize(&Transaction::new()).unwrap();

		assert_eq!(&bytes[..4], b"BINA");
		assert_eq!(&bytes[4..8], b"1.00");
		assert_eq!(&bytes[bytes.len() - 4..], b"#END");

		let mut output = Transaction::new();
		serializer.deserialize(&mut output, &bytes, &AtomDatabase::new()).unwrap();
		assert!(output.is_empty());
	}

	#[test]
	fn wrong_magic_is_rejected() {
		let serializer = BinarySerializer::new();
		let mut output = Transaction::new();
		let result = serializer.deserialize(&mut output, b"NOPE1.00", &AtomDatabase::new());
		assert!(matches!(result, Err(SerializeError::InvalidMagic)));
	}

	#[test]
	fn truncated_files_are_rejected() {
		let serializer = BinarySerializer::new();
		let bytes = serializer.serialize(&Transaction::new()).unwrap();

		let mut output = Transaction::new();
		let result =
			serializer.deserialize(&mut output, &bytes[..bytes.len() - 6], &AtomDatabase::new());
		assert!(result.is_err());
		assert!(output.is_empty());
	}
}
