use std::any::Any;
use std::rc::Rc;
use std::sync::OnceLock;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ember_reflect::{
	new_object, objects_deep_equal, register_meta_class, Atom, AtomDatabase, Dictionary,
	MetaClass, MetaObject, MetaProperty, Name, ObjectRef, Transaction, WString,
};
use ember_serialize::memory_reader::MemoryViewReader;
use ember_serialize::{compress, decompress, BinarySerializer, SerializeError};


/// Scene node with one of every native scalar, vector, pair, dictionary
/// and vector-of-dictionary property, plus an abstract atom slot and an
/// object reference.
#[derive(Clone)]
struct SceneNode {
	export_name: Option<Name>,

	// base class property
	tag: u32,

	flag: bool,
	tiny: i8,
	small: u8,
	short: i16,
	half_word: u16,
	word: i32,
	unsigned_word: u32,
	large: i64,
	unsigned_large: u64,
	scale: f32,
	precise: f64,
	label: String,
	wide_label: WString,
	binding: Name,
	offset2: Vec2,
	offset3: Vec3,
	offset4: Vec4,
	basis: Mat3,
	transform: Mat4,
	range: (u32, String),
	weights: Vec<i32>,
	lookup: Dictionary<String, f32>,
	layers: Vec<Dictionary<u8, u16>>,
	payload: Atom,
	child: Option<ObjectRef>,
}

impl Default for SceneNode {
	fn default() -> SceneNode {
		SceneNode {
			export_name: None,
			tag: 0,
			flag: false,
			tiny: 0,
			small: 0,
			short: 0,
			half_word: 0,
			word: 0,
			unsigned_word: 0,
			large: 0,
			unsigned_large: 0,
			scale: 0.0,
			precise: 0.0,
			label: String::new(),
			wide_label: WString::default(),
			binding: Name::default(),
			offset2: Vec2::ZERO,
			offset3: Vec3::ZERO,
			offset4: Vec4::ZERO,
			basis: Mat3::IDENTITY,
			transform: Mat4::IDENTITY,
			range: (0, String::new()),
			weights: Vec::new(),
			lookup: Dictionary::new(),
			layers: Vec::new(),
			payload: Atom::Null,
			child: None,
		}
	}
}

fn scene_node_base_class() -> &'static MetaClass {
	static CLASS: OnceLock<&'static MetaClass> = OnceLock::new();
	CLASS.get_or_init(|| {
		register_meta_class(MetaClass::new(
			"SceneNodeBase",
			None,
			vec![MetaProperty::new::<SceneNode, u32>("Tag", |o| &o.tag, |o, v| o.tag = v)],
			|| new_object(SceneNode::default()),
		))
	})
}

fn scene_node_class() -> &'static MetaClass {
	static CLASS: OnceLock<&'static MetaClass> = OnceLock::new();
	CLASS.get_or_init(|| {
		register_meta_class(MetaClass::new(
			"SceneNode",
			Some(scene_node_base_class()),
			vec![
				MetaProperty::new::<SceneNode, bool>("Flag", |o| &o.flag, |o, v| o.flag = v),
				MetaProperty::new::<SceneNode, i8>("Tiny", |o| &o.tiny, |o, v| o.tiny = v),
				MetaProperty::new::<SceneNode, u8>("Small", |o| &o.small, |o, v| o.small = v),
				MetaProperty::new::<SceneNode, i16>("Short", |o| &o.short, |o, v| o.short = v),
				MetaProperty::new::<SceneNode, u16>("HalfWord", |o| &o.half_word, |o, v| o.half_word = v),
				MetaProperty::new::<SceneNode, i32>("Word", |o| &o.word, |o, v| o.word = v),
				MetaProperty::new::<SceneNode, u32>("UnsignedWord", |o| &o.unsigned_word, |o, v| o.unsigned_word = v),
				MetaProperty::new::<SceneNode, i64>("Large", |o| &o.large, |o, v| o.large = v),
				MetaProperty::new::<SceneNode, u64>("UnsignedLarge", |o| &o.unsigned_large, |o, v| o.unsigned_large = v),
				MetaProperty::new::<SceneNode, f32>("Scale", |o| &o.scale, |o, v| o.scale = v),
				MetaProperty::new::<SceneNode, f64>("Precise", |o| &o.precise, |o, v| o.precise = v),
				MetaProperty::new::<SceneNode, String>("Label", |o| &o.label, |o, v| o.label = v),
				MetaProperty::new::<SceneNode, WString>("WideLabel", |o| &o.wide_label, |o, v| o.wide_label = v),
				MetaProperty::new::<SceneNode, Name>("Binding", |o| &o.binding, |o, v| o.binding = v),
				MetaProperty::new::<SceneNode, Vec2>("Offset2", |o| &o.offset2, |o, v| o.offset2 = v),
				MetaProperty::new::<SceneNode, Vec3>("Offset3", |o| &o.offset3, |o, v| o.offset3 = v),
				MetaProperty::new::<SceneNode, Vec4>("Offset4", |o| &o.offset4, |o, v| o.offset4 = v),
				MetaProperty::new::<SceneNode, Mat3>("Basis", |o| &o.basis, |o, v| o.basis = v),
				MetaProperty::new::<SceneNode, Mat4>("Transform", |o| &o.transform, |o, v| o.transform = v),
				MetaProperty::new::<SceneNode, (u32, String)>("Range", |o| &o.range, |o, v| o.range = v),
				MetaProperty::new::<SceneNode, Vec<i32>>("Weights", |o| &o.weights, |o, v| o.weights = v),
				MetaProperty::new::<SceneNode, Dictionary<String, f32>>("Lookup", |o| &o.lookup, |o, v| o.lookup = v),
				MetaProperty::new::<SceneNode, Vec<Dictionary<u8, u16>>>("Layers", |o| &o.layers, |o, v| o.layers = v),
				MetaProperty::new::<SceneNode, Atom>("Payload", |o| &o.payload, |o, v| o.payload = v),
				MetaProperty::new::<SceneNode, Option<ObjectRef>>("Child", |o| &o.child, |o, v| o.child = v),
			],
			|| new_object(SceneNode::default()),
		))
	})
}

impl MetaObject for SceneNode {
	fn meta_class(&self) -> &'static MetaClass {
		scene_node_class()
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}

	fn object_name(&self) -> Option<&Name> {
		self.export_name.as_ref()
	}

	fn set_object_name(&mut self, name: Name) {
		self.export_name = Some(name);
	}
}


fn random_payload(rng: &mut StdRng) -> Atom {
	match rng.gen_range(0..4) {
		0 => Atom::F32(rng.gen()),
		1 => Atom::U32(rng.gen()),
		2 => Atom::I64(rng.gen()),
		_ => Atom::Str(format!("payload-{}", rng.gen::<u16>())),
	}
}

fn random_node(rng: &mut StdRng, with_child: bool) -> SceneNode {
	let mut node = SceneNode {
		tag: rng.gen(),
		flag: rng.gen(),
		tiny: rng.gen(),
		small: rng.gen(),
		short: rng.gen(),
		half_word: rng.gen(),
		word: rng.gen(),
		unsigned_word: rng.gen(),
		large: rng.gen(),
		unsigned_large: rng.gen(),
		scale: rng.gen(),
		precise: rng.gen(),
		label: format!("node-{}", rng.gen::<u32>()),
		wide_label: WString::from_str(&format!("wide-{}", rng.gen::<u32>())),
		binding: Name::from(format!("binding-{}", rng.gen::<u16>())),
		offset2: Vec2::new(rng.gen(), rng.gen()),
		offset3: Vec3::new(rng.gen(), rng.gen(), rng.gen()),
		offset4: Vec4::new(rng.gen(), rng.gen(), rng.gen(), rng.gen()),
		basis: Mat3::from_cols_array(&std::array::from_fn(|_| rng.gen())),
		transform: Mat4::from_cols_array(&std::array::from_fn(|_| rng.gen())),
		range: (rng.gen(), format!("range-{}", rng.gen::<u16>())),
		weights: (0..rng.gen_range(0..6)).map(|_| rng.gen()).collect(),
		lookup: {
			let mut dictionary = Dictionary::new();
			for index in 0..rng.gen_range(0..4) {
				dictionary.insert(format!("key-{index}"), rng.gen());
			}
			dictionary
		},
		layers: (0..rng.gen_range(0..3))
			.map(|_| {
				let mut dictionary = Dictionary::new();
				for _ in 0..rng.gen_range(1..4) {
					dictionary.insert(rng.gen(), rng.gen());
				}
				dictionary
			})
			.collect(),
		payload: random_payload(rng),
		..SceneNode::default()
	};

	if with_child {
		node.child = Some(new_object(random_node(rng, false)));
	}

	node
}


// Serialize, compress, decompress, deserialize; every object and its
// children must come back structurally identical.
#[test]
fn full_transaction_round_trip() {
	let mut rng = StdRng::seed_from_u64(0x5EED);

	let mut input = Transaction::new();
	for index in 0..32 {
		let mut node = random_node(&mut rng, index % 2 == 0);
		if index % 4 == 0 {
			node.export_name = Some(Name::from(format!("node_{index}")));
		}
		input.add(new_object(node));
	}

	let serializer = BinarySerializer::new();
	let bytes = serializer.serialize(&input).unwrap();

	let packed = compress(&bytes);
	let unpacked = decompress(&packed).unwrap();
	assert_eq!(unpacked, bytes);

	let mut output = Transaction::new();
	serializer
		.deserialize(&mut output, &unpacked, &AtomDatabase::new())
		.unwrap();

	assert_eq!(input.len(), output.len());

	for (index, (before, after)) in input.iter().zip(output.iter()).enumerate() {
		assert!(objects_deep_equal(before, after), "object {index} diverged");
	}

	// Exported objects keep their names
	for index in (0..32).step_by(4) {
		let object = &output.objects()[index];
		let name = object.borrow().object_name().cloned().expect("exported name");
		assert_eq!(name.as_str(), format!("node_{index}"));
	}
}

// Objects outside the transaction are written as imports and resolve back
// to the very same instances.
#[test]
fn foreign_objects_import_by_name() {
	let mut rng = StdRng::seed_from_u64(7);

	let mut palette = random_node(&mut rng, false);
	palette.export_name = Some(Name::new("shared_palette"));
	let palette = new_object(palette);

	let mut owner = random_node(&mut rng, false);
	owner.child = Some(palette.clone());

	let mut input = Transaction::new();
	input.add(new_object(owner));

	let serializer = BinarySerializer::new();
	let bytes = serializer.serialize(&input).unwrap();

	let mut database = AtomDatabase::new();
	database.register(Name::new("shared_palette"), palette.clone());

	let mut output = Transaction::new();
	serializer.deserialize(&mut output, &bytes, &database).unwrap();

	let restored = output.objects()[0].borrow();
	let restored = restored.as_any().downcast_ref::<SceneNode>().unwrap();
	let child = restored.child.as_ref().expect("child");
	assert!(Rc::ptr_eq(child, &palette), "import resolves to the registered instance");

	// Without the database entry the import fails and nothing is committed
	let mut failed = Transaction::new();
	let result = serializer.deserialize(&mut failed, &bytes, &AtomDatabase::new());
	assert!(matches!(result, Err(SerializeError::ImportNotFound(_))));
	assert!(failed.is_empty());
}

#[test]
fn unknown_classes_abort_deserialization() {
	let mut rng = StdRng::seed_from_u64(11);

	let mut input = Transaction::new();
	input.add(new_object(random_node(&mut rng, false)));

	let serializer = BinarySerializer::new();
	let mut bytes = serializer.serialize(&input).unwrap();

	// Damage the class table in place: same length, unknown name
	let needle = b"SceneNodeBase";
	let position = bytes
		.windows(needle.len())
		.position(|window| window == needle)
		.expect("class name in the table");
	bytes[position..position + needle.len()].copy_from_slice(b"SceneNodeBasX");

	let mut output = Transaction::new();
	let result = serializer.deserialize(&mut output, &bytes, &AtomDatabase::new());
	assert!(matches!(result, Err(SerializeError::UnknownClass(_))));
	assert!(output.is_empty());
}

#[test]
fn null_object_references_round_trip() {
	let mut input = Transaction::new();
	input.add(new_object(SceneNode { word: 5, ..SceneNode::default() }));

	let serializer = BinarySerializer::new();
	let bytes = serializer.serialize(&input).unwrap();

	let mut output = Transaction::new();
	serializer
		.deserialize(&mut output, &bytes, &AtomDatabase::new())
		.unwrap();

	let restored = output.objects()[0].borrow();
	let restored = restored.as_any().downcast_ref::<SceneNode>().unwrap();
	assert_eq!(restored.word, 5);
	assert!(restored.child.is_none());
}

#[test]
fn default_properties_are_elided_from_the_stream() {
	let mut sparse = Transaction::new();
	sparse.add(new_object(SceneNode { flag: true, ..SceneNode::default() }));

	let mut dense_rng = StdRng::seed_from_u64(3);
	let mut dense = Transaction::new();
	dense.add(new_object(random_node(&mut dense_rng, false)));

	let serializer = BinarySerializer::new();
	let sparse_bytes = serializer.serialize(&sparse).unwrap();
	let dense_bytes = serializer.serialize(&dense).unwrap();

	assert!(sparse_bytes.len() < dense_bytes.len());

	// The sparse object still round-trips exactly
	let mut output = Transaction::new();
	serializer
		.deserialize(&mut output, &sparse_bytes, &AtomDatabase::new())
		.unwrap();
	assert!(objects_deep_equal(&sparse.objects()[0], &output.objects()[0]));
}

#[test]
fn shared_children_deduplicate_to_one_streamed_object() {
	let mut rng = StdRng::seed_from_u64(23);

	let shared_child = new_object(random_node(&mut rng, false));

	let mut input = Transaction::new();
	for _ in 0..3 {
		let mut node = random_node(&mut rng, false);
		node.child = Some(shared_child.clone());
		input.add(new_object(node));
	}

	let serializer = BinarySerializer::new();
	let bytes = serializer.serialize(&input).unwrap();

	let mut output = Transaction::new();
	serializer
		.deserialize(&mut output, &bytes, &AtomDatabase::new())
		.unwrap();

	// All three parents point at one restored child instance
	let first_child = output.objects()[0]
		.borrow()
		.as_any()
		.downcast_ref::<SceneNode>()
		.unwrap()
		.child
		.clone()
		.unwrap();

	for parent in output.iter().skip(1) {
		let parent = parent.borrow();
		let node = parent.as_any().downcast_ref::<SceneNode>().unwrap();
		assert!(Rc::ptr_eq(node.child.as_ref().unwrap(), &first_child));
	}
}

#[test]
fn the_file_header_is_validated_with_a_reader() {
	let serializer = BinarySerializer::new();
	let bytes = serializer.serialize(&Transaction::new()).unwrap();

	let mut reader = MemoryViewReader::new(&bytes);
	let magic: [u8; 4] = reader.read_pod().unwrap();
	let version: [u8; 4] = reader.read_pod().unwrap();
	assert_eq!(&magic, b"BINA");
	assert_eq!(&version, b"1.00");
}
