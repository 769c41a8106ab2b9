//! Check constructors of class files assembled in memory

use byteorder::{BigEndian, WriteBytesExt};
use escaped_this::analysis::{Finding, Reason, Site};
use escaped_this::check::{check_class_bytes, EscapedThisChecker, Error, Settings};
use escaped_this::jvm::class_file::{ClassFile, Version};
use escaped_this::jvm::{self, ClassAccessFlags};
use std::collections::HashMap;

const ALOAD_0: u8 = 0x2a;
const ALOAD_1: u8 = 0x2b;
const DUP: u8 = 0x59;
const POP: u8 = 0x57;
const RETURN: u8 = 0xb1;
const PUTSTATIC: u8 = 0xb3;
const PUTFIELD: u8 = 0xb5;
const INVOKEVIRTUAL: u8 = 0xb6;
const INVOKESPECIAL: u8 = 0xb7;
const INVOKESTATIC: u8 = 0xb8;
const INVOKEDYNAMIC: u8 = 0xba;
const NEW: u8 = 0xbb;

/// Just enough of a class file writer to build classes with constructors
struct ClassAssembler {
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    constants: Vec<u8>,
    constant_count: u16,
    interned: HashMap<Vec<u8>, u16>,
    methods: Vec<u8>,
    method_count: u16,
}

impl ClassAssembler {
    fn new(name: &str) -> ClassAssembler {
        let mut assembler = ClassAssembler {
            access_flags: 0x0021,
            this_class: 0,
            super_class: 0,
            constants: vec![],
            constant_count: 0,
            interned: HashMap::new(),
            methods: vec![],
            method_count: 0,
        };
        assembler.this_class = assembler.class(name);
        assembler.super_class = assembler.class("java/lang/Object");
        assembler
    }

    fn constant(&mut self, entry: Vec<u8>) -> u16 {
        if let Some(index) = self.interned.get(&entry) {
            return *index;
        }
        self.constants.extend_from_slice(&entry);
        self.constant_count += 1;
        self.interned.insert(entry, self.constant_count);
        self.constant_count
    }

    fn utf8(&mut self, string: &str) -> u16 {
        let mut entry = vec![1];
        entry.write_u16::<BigEndian>(string.len() as u16).unwrap();
        entry.extend_from_slice(string.as_bytes());
        self.constant(entry)
    }

    fn with_indices(&mut self, tag: u8, indices: &[u16]) -> u16 {
        let mut entry = vec![tag];
        for index in indices {
            entry.write_u16::<BigEndian>(*index).unwrap();
        }
        self.constant(entry)
    }

    fn class(&mut self, name: &str) -> u16 {
        let name = self.utf8(name);
        self.with_indices(7, &[name])
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        self.with_indices(12, &[name, descriptor])
    }

    fn method_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let owner = self.class(owner);
        let name_and_type = self.name_and_type(name, descriptor);
        self.with_indices(10, &[owner, name_and_type])
    }

    fn field_ref(&mut self, owner: &str, name: &str, descriptor: &str) -> u16 {
        let owner = self.class(owner);
        let name_and_type = self.name_and_type(name, descriptor);
        self.with_indices(9, &[owner, name_and_type])
    }

    fn invoke_dynamic(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_and_type = self.name_and_type(name, descriptor);
        self.with_indices(18, &[0, name_and_type])
    }

    fn object_init(&mut self) -> u16 {
        self.method_ref("java/lang/Object", "<init>", "()V")
    }

    /// Add a method, with a `Code` attribute if `code` is present
    fn method(&mut self, name: &str, descriptor: &str, code: Option<Vec<u8>>) {
        let name = self.utf8(name);
        let descriptor = self.utf8(descriptor);
        let code_name = self.utf8("Code");

        let methods = &mut self.methods;
        methods.write_u16::<BigEndian>(0x0001).unwrap();
        methods.write_u16::<BigEndian>(name).unwrap();
        methods.write_u16::<BigEndian>(descriptor).unwrap();
        match code {
            None => methods.write_u16::<BigEndian>(0).unwrap(),
            Some(code) => {
                methods.write_u16::<BigEndian>(1).unwrap();
                methods.write_u16::<BigEndian>(code_name).unwrap();
                methods
                    .write_u32::<BigEndian>(12 + code.len() as u32)
                    .unwrap();
                methods.write_u16::<BigEndian>(4).unwrap(); // max stack
                methods.write_u16::<BigEndian>(4).unwrap(); // max locals
                methods.write_u32::<BigEndian>(code.len() as u32).unwrap();
                methods.extend_from_slice(&code);
                methods.write_u16::<BigEndian>(0).unwrap(); // exception table
                methods.write_u16::<BigEndian>(0).unwrap(); // attributes
            }
        }
        self.method_count += 1;
    }

    fn finish(self) -> Vec<u8> {
        let mut bytes = vec![];
        bytes.write_u32::<BigEndian>(0xCAFEBABE).unwrap();
        bytes.write_u16::<BigEndian>(Version::JAVA8.minor).unwrap();
        bytes.write_u16::<BigEndian>(Version::JAVA8.major).unwrap();
        bytes
            .write_u16::<BigEndian>(self.constant_count + 1)
            .unwrap();
        bytes.extend_from_slice(&self.constants);
        bytes.write_u16::<BigEndian>(self.access_flags).unwrap();
        bytes.write_u16::<BigEndian>(self.this_class).unwrap();
        bytes.write_u16::<BigEndian>(self.super_class).unwrap();
        bytes.write_u16::<BigEndian>(0).unwrap(); // interfaces
        bytes.write_u16::<BigEndian>(0).unwrap(); // fields
        bytes.write_u16::<BigEndian>(self.method_count).unwrap();
        bytes.extend_from_slice(&self.methods);
        bytes.write_u16::<BigEndian>(0).unwrap(); // attributes
        bytes
    }
}

fn with_index(opcode: u8, index: u16) -> [u8; 3] {
    let [hi, lo] = index.to_be_bytes();
    [opcode, hi, lo]
}

/// `aload_0; invokespecial Object.<init>()V`
fn super_call(class: &mut ClassAssembler) -> Vec<u8> {
    let init = class.object_init();
    let mut code = vec![ALOAD_0];
    code.extend_from_slice(&with_index(INVOKESPECIAL, init));
    code
}

fn check(bytes: &[u8]) -> Vec<Finding> {
    check_class_bytes(bytes, &Settings::default()).unwrap()
}

#[test]
fn default_constructor() {
    let mut class = ClassAssembler::new("me/alec/Point");
    let mut code = super_call(&mut class);
    code.push(RETURN);
    class.method("<init>", "()V", Some(code));

    let bytes = class.finish();
    let parsed = ClassFile::parse(&bytes).unwrap();
    assert_eq!(parsed.version, Version::JAVA8);
    assert_eq!(parsed.name().unwrap().to_string(), "me.alec.Point");
    assert_eq!(parsed.constructors().unwrap().len(), 1);

    assert!(check(&bytes).is_empty());
}

#[test]
fn this_registered_with_a_listener() {
    let mut class = ClassAssembler::new("me/alec/Point");
    let register = class.method_ref("me/alec/Registry", "register", "(Ljava/lang/Object;)V");
    let mut code = super_call(&mut class);
    code.push(ALOAD_0);
    code.extend_from_slice(&with_index(INVOKESTATIC, register));
    code.push(RETURN);
    class.method("<init>", "()V", Some(code));

    let findings = check(&class.finish());
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].class.to_string(), "me.alec.Point");
    assert_eq!(findings[0].reason, Reason::EscapedThisReference);
    assert_eq!(findings[0].reason.code(), "ESCAPED_THIS_REFERENCE");
    assert_eq!(
        findings[0].site,
        Site::CallArgument {
            call: 3,
            load: 2,
            target: String::from("me/alec/Registry.register(Ljava/lang/Object;)V"),
        }
    );
}

#[test]
fn this_published_through_fields() {
    let mut class = ClassAssembler::new("me/alec/Point");
    let instance = class.field_ref("me/alec/Point", "instance", "Lme/alec/Point;");
    let itself = class.field_ref("me/alec/Point", "itself", "Lme/alec/Point;");
    let mut code = super_call(&mut class);
    code.push(ALOAD_0);
    code.extend_from_slice(&with_index(PUTSTATIC, instance));
    code.push(ALOAD_0);
    code.push(ALOAD_0);
    code.extend_from_slice(&with_index(PUTFIELD, itself));
    code.push(RETURN);
    class.method("<init>", "()V", Some(code));

    let findings = check(&class.finish());
    let stores: Vec<&Site> = findings.iter().map(|finding| &finding.site).collect();
    assert_eq!(
        stores,
        vec![
            &Site::FieldStore {
                store: 3,
                field: String::from("me/alec/Point.instance"),
            },
            &Site::FieldStore {
                store: 6,
                field: String::from("me/alec/Point.itself"),
            },
        ]
    );
}

#[test]
fn ordinary_field_initialization() {
    let mut class = ClassAssembler::new("me/alec/Point");
    let name = class.field_ref("me/alec/Point", "name", "Ljava/lang/String;");
    let other = class.class("me/alec/Other");
    let other_init = class.method_ref("me/alec/Other", "<init>", "()V");
    let other_field = class.field_ref("me/alec/Point", "other", "Lme/alec/Other;");

    // this.name = name; this.other = new Other();
    let mut code = super_call(&mut class);
    code.push(ALOAD_0);
    code.push(ALOAD_1);
    code.extend_from_slice(&with_index(PUTFIELD, name));
    code.push(ALOAD_0);
    code.extend_from_slice(&with_index(NEW, other));
    code.push(DUP);
    code.extend_from_slice(&with_index(INVOKESPECIAL, other_init));
    code.extend_from_slice(&with_index(PUTFIELD, other_field));
    code.push(RETURN);
    class.method("<init>", "(Ljava/lang/String;)V", Some(code));

    assert!(check(&class.finish()).is_empty());
}

#[test]
fn this_passed_to_a_new_object() {
    let mut class = ClassAssembler::new("me/alec/Point");
    let listener = class.class("me/alec/Listener");
    let listener_init = class.method_ref("me/alec/Listener", "<init>", "(Lme/alec/Point;)V");

    // new Listener(this);
    let mut code = super_call(&mut class);
    code.extend_from_slice(&with_index(NEW, listener));
    code.push(DUP);
    code.push(ALOAD_0);
    code.extend_from_slice(&with_index(INVOKESPECIAL, listener_init));
    code.push(POP);
    code.push(RETURN);
    class.method("<init>", "()V", Some(code));

    let findings = check(&class.finish());
    assert_eq!(findings.len(), 1);
    assert!(matches!(
        findings[0].site,
        Site::CallArgument {
            call: 5,
            load: 4,
            ..
        }
    ));
}

#[test]
fn receiver_alone_does_not_escape() {
    let mut class = ClassAssembler::new("me/alec/Point");
    let init = class.method_ref("me/alec/Point", "init", "()V");
    let mut code = super_call(&mut class);
    code.push(ALOAD_0);
    code.extend_from_slice(&with_index(INVOKEVIRTUAL, init));
    code.push(RETURN);
    class.method("<init>", "()V", Some(code));

    assert!(check(&class.finish()).is_empty());
}

#[test]
fn lambda_capturing_this() {
    let mut class = ClassAssembler::new("me/alec/Point");
    let lambda = class.invoke_dynamic("run", "(Lme/alec/Point;)Ljava/lang/Runnable;");
    let mut code = super_call(&mut class);
    code.push(ALOAD_0);
    code.extend_from_slice(&with_index(INVOKEDYNAMIC, lambda));
    code.extend_from_slice(&[0, 0]);
    code.push(POP);
    code.push(RETURN);
    class.method("<init>", "()V", Some(code));
    let bytes = class.finish();

    assert_eq!(check(&bytes).len(), 1);

    let settings = Settings {
        include_invokedynamic: false,
        ..Settings::default()
    };
    assert!(check_class_bytes(&bytes, &settings).unwrap().is_empty());
}

#[test]
fn only_constructors_are_checked() {
    let mut class = ClassAssembler::new("me/alec/Point");
    let register = class.method_ref("me/alec/Registry", "register", "(Ljava/lang/Object;)V");
    let mut escaping = vec![ALOAD_0];
    escaping.extend_from_slice(&with_index(INVOKESTATIC, register));
    escaping.push(RETURN);

    class.method("publish", "()V", Some(escaping.clone()));
    class.method("<clinit>", "()V", Some(vec![RETURN]));
    class.method("abstractish", "()V", None);
    class.method("<init>", "(I)V", Some(escaping.clone()));
    class.method("<init>", "(J)V", Some(escaping));

    let findings = check(&class.finish());
    assert_eq!(findings.len(), 2);
}

#[test]
fn synthetic_classes_can_be_skipped() {
    let mut class = ClassAssembler::new("me/alec/Point$1");
    class.access_flags |= ClassAccessFlags::SYNTHETIC.bits();
    let outer = class.field_ref("me/alec/Point", "last", "Ljava/lang/Object;");
    let mut code = super_call(&mut class);
    code.push(ALOAD_0);
    code.extend_from_slice(&with_index(PUTSTATIC, outer));
    code.push(RETURN);
    class.method("<init>", "()V", Some(code));
    let bytes = class.finish();

    assert_eq!(check(&bytes).len(), 1);

    let parsed = ClassFile::parse(&bytes).unwrap();
    let checker = EscapedThisChecker::new(Settings {
        skip_synthetic_classes: true,
        ..Settings::default()
    });
    let mut findings: Vec<Finding> = vec![];
    assert_eq!(checker.check_class(&parsed, &mut findings).unwrap(), 0);
    assert!(findings.is_empty());
}

#[test]
fn unreadable_classes() {
    match check_class_bytes(&[0xCA, 0xFE, 0xBA, 0xBF], &Settings::default()) {
        Err(Error::ClassFormat(jvm::Error::BadMagic(0xCAFEBABF))) => (),
        other => panic!("unexpected result {:?}", other),
    }

    let mut class = ClassAssembler::new("me/alec/Point");
    class.method("<init>", "()V", Some(vec![ALOAD_0, INVOKESPECIAL, 0]));
    match check_class_bytes(&class.finish(), &Settings::default()) {
        Err(Error::ClassFormat(jvm::Error::TruncatedCode { offset: 1 })) => (),
        other => panic!("unexpected result {:?}", other),
    }
}
