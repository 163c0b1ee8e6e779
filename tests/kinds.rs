use bytemuck::{Pod, Zeroable};
use wire_buf::prelude::*;

macro_rules! ser_des_cmp {
    ($item:expr, $ty:ty, $size:expr) => {
        let item: $ty = $item;
        let mut wr = BufWriter::growable(0, 4096);
        wr.write_value_safe(&item).unwrap();
        assert_eq!(wr.len(), $size);
        assert_eq!(item.wire_size(), $size);
        let mut rd = BufReader::from_writer(&wr, AllocationMode::Borrowed);
        assert_eq!(rd.read_value_safe::<$ty>().unwrap(), item);
        assert_eq!(rd.remaining(), 0);
    };
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(u16)]
enum EntityKind {
    Player = 1,
    Projectile = 2,
    Pickup = 0xFFFF,
}
impl_wire_enum!(EntityKind: u16 { Player, Projectile, Pickup });

#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
struct Velocity {
    dx: f32,
    dy: f32,
}
impl_wire_pod!(Velocity);

#[derive(Default, Debug, PartialEq)]
struct Lobby {
    name: String,
    players: Vec<FixedString<12>>,
}

impl NetworkSerializable for Lobby {
    fn serialized_size(&self) -> usize {
        self.name.wire_size() + self.players.wire_size()
    }

    fn write_to(&self, wr: &mut BufWriter<'_>) -> Result<(), WireBufError> {
        wr.write_value(&self.name)?;
        wr.write_value(&self.players)
    }

    fn read_from(&mut self, rd: &mut BufReader<'_>) -> Result<(), WireBufError> {
        self.name = rd.read_value_safe()?;
        self.players = rd.read_value_safe()?;
        Ok(())
    }
}

#[test]
fn primitive() {
    ser_des_cmp!(-7, i64, 8);
    ser_des_cmp!(u128::MAX, u128, 16);
    ser_des_cmp!(f64::MIN_POSITIVE, f64, 8);
    ser_des_cmp!(true, bool, 1);
    assert_eq!(<u16 as SerializeWire>::KIND, SerializationKind::Primitive);
}

#[test]
fn enumeration() {
    ser_des_cmp!(EntityKind::Pickup, EntityKind, 2);
    assert_eq!(EntityKind::Projectile.to_repr(), 2);
    assert_eq!(EntityKind::from_repr(3), None);
}

#[test]
fn plain_old_data() {
    ser_des_cmp!(Velocity { dx: 0.5, dy: -1.0 }, Velocity, 8);
    assert_eq!(<Velocity as DeserializeWire>::KIND, SerializationKind::Struct);
}

#[test]
fn serializable() {
    ser_des_cmp!(
        Lobby {
            name: "Arena".into(),
            players: vec![
                FixedString::try_from("ann").unwrap(),
                FixedString::try_from("bob").unwrap()
            ],
        },
        Lobby,
        (4 + 10) + (4 + 7 + 7)
    );
}

#[test]
fn strings() {
    ser_des_cmp!(String::new(), String, 4);
    ser_des_cmp!(String::from("päivää"), String, 4 + 12);
    ser_des_cmp!(FixedString::try_from("x").unwrap(), FixedString<1>, 5);
    assert_eq!(
        <FixedString<4> as SerializeWire>::KIND,
        SerializationKind::FixedString
    );
}

#[test]
fn arrays() {
    ser_des_cmp!(vec![], Vec<u32>, 4);
    ser_des_cmp!(
        vec![EntityKind::Player, EntityKind::Pickup],
        Vec<EntityKind>,
        4 + 4
    );
    ser_des_cmp!(vec![Velocity::zeroed(); 3], Vec<Velocity>, 4 + 24);
    ser_des_cmp!(
        vec![String::from("a"), String::from("bc")],
        Vec<String>,
        4 + 6 + 8
    );
}

#[test]
fn one_byte_strings() {
    let names = vec![
        AsciiString::new("hi").unwrap(),
        AsciiString::new("yo").unwrap(),
    ];
    ser_des_cmp!(names.clone(), Vec<AsciiString>, 4 + 6 + 6);
    assert_eq!(
        <AsciiString as SerializeWire>::KIND,
        SerializationKind::String
    );

    // Same bytes as writing each element by hand in one byte width
    let mut typed = BufWriter::new(16);
    typed.write_value_safe(&names).unwrap();
    let mut manual = BufWriter::new(16);
    manual.write_u32_safe(2).unwrap();
    manual.write_str_safe("hi", CharWidth::OneByte).unwrap();
    manual.write_str_safe("yo", CharWidth::OneByte).unwrap();
    assert_eq!(typed.as_slice(), manual.as_slice());

    let mut rd = BufReader::from_writer(&manual, AllocationMode::Borrowed);
    assert!(rd.try_begin_read(16));
    assert_eq!(rd.read_array::<AsciiString>(), Ok(names));
}

#[test]
fn unchecked_after_begin() {
    let kinds = vec![EntityKind::Player, EntityKind::Projectile];
    let mut wr = BufWriter::new(16);
    assert!(wr.try_begin_write_value(&kinds));
    wr.write_array(&kinds).unwrap();
    assert_eq!(wr.len(), 8);

    let mut rd = BufReader::from_writer(&wr, AllocationMode::Borrowed);
    assert!(rd.try_begin_read(8));
    assert_eq!(rd.read_array::<EntityKind>(), Ok(kinds));
}

#[test]
fn pod_slice() {
    let velocities = [Velocity { dx: 1.0, dy: 2.0 }, Velocity { dx: 3.0, dy: 4.0 }];
    let mut wr = BufWriter::new(32);
    wr.write_pod_slice_safe(&velocities).unwrap();
    let mut rd = BufReader::from_writer(&wr, AllocationMode::Borrowed);
    assert_eq!(rd.read_array_safe::<Velocity>(), Ok(velocities.to_vec()));
}
