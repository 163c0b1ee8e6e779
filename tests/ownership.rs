use wire_buf::prelude::*;

#[test]
fn borrowed_writer_leaves_storage_to_caller() {
    let mut buf = [0u8; 8];
    {
        let mut wr = BufWriter::borrowed(&mut buf);
        wr.write_u16_safe(0x0A0B).unwrap();
        wr.write_u8_safe(0xCC).unwrap();
        assert_eq!(wr.allocation_mode(), AllocationMode::Borrowed);
    }
    assert_eq!(&buf[..2], &0x0A0Bu16.to_ne_bytes());
    assert_eq!(buf[2], 0xCC);

    let mut rd = BufReader::borrowed(&buf);
    assert_eq!(rd.read_u16_safe(), Ok(0x0A0B));
    assert_eq!(rd.read_u8_safe(), Ok(0xCC));
    assert_eq!(rd.remaining(), 5);
}

#[test]
fn borrowed_reader_leaves_bytes_intact() {
    let bytes = vec![1u8, 2, 3, 4];
    {
        let mut rd = BufReader::new(&bytes, AllocationMode::Borrowed);
        assert_eq!(rd.read_bytes_safe(4).unwrap(), &[1, 2, 3, 4]);
    }
    let mut again = BufReader::new(&bytes, AllocationMode::Borrowed);
    assert_eq!(again.as_slice().as_ptr(), bytes.as_ptr());
    assert_eq!(again.read_bytes_safe(4).unwrap(), &[1, 2, 3, 4]);
    assert_eq!(bytes, [1, 2, 3, 4]);
}

#[test]
fn owned_reader_outlives_source() {
    let mut rd = {
        let mut wr = BufWriter::new(4);
        wr.write_u32_safe(99).unwrap();
        BufReader::owned(wr.as_slice())
    };
    assert_eq!(rd.allocation_mode(), AllocationMode::Owned);
    assert_eq!(rd.read_u32_safe(), Ok(99));
}

#[test]
fn reader_over_writer_is_zero_copy() {
    let mut wr = BufWriter::new(4);
    wr.write_u16_safe(5).unwrap();
    let rd = BufReader::from_writer(&wr, AllocationMode::Borrowed);
    assert_eq!(rd.as_slice().as_ptr(), wr.as_slice().as_ptr());
    assert_eq!(rd.len(), 2);

    let copy = BufReader::from_writer(&wr, AllocationMode::Owned);
    assert_ne!(copy.as_slice().as_ptr(), wr.as_slice().as_ptr());
    assert_eq!(copy.as_slice(), wr.as_slice());
}

#[test]
fn sub_reader_promotion() {
    let mut wr = BufWriter::new(12);
    wr.write_u32_safe(1).unwrap();
    wr.write_u32_safe(2).unwrap();
    wr.write_u32_safe(3).unwrap();
    let outer = BufReader::from_writer(&wr, AllocationMode::Borrowed);
    let mut inner = BufReader::from_reader(&outer, AllocationMode::Owned, 4, 4).unwrap();
    assert_eq!(inner.read_u32_safe(), Ok(2));
    assert_eq!(inner.remaining(), 0);
}

#[test]
fn promoted_reader_escapes_borrowed_scope() {
    let mut promoted: BufReader<'static> = {
        let bytes = [0x10u8, 0x20, 0x30, 0x40];
        let view = BufReader::borrowed(&bytes);
        let sub = BufReader::from_reader(&view, AllocationMode::Owned, 1, 2).unwrap();
        sub.into_owned()
    };
    assert_eq!(promoted.allocation_mode(), AllocationMode::Owned);
    assert_eq!(promoted.read_bytes_safe(2).unwrap(), &[0x20, 0x30]);

    let from_writer: BufReader<'static> = {
        let mut wr = BufWriter::new(4);
        wr.write_u32_safe(7).unwrap();
        let rd = BufReader::from_writer(&wr, AllocationMode::Borrowed);
        rd.into_owned()
    };
    assert_eq!(from_writer.len(), 4);
}

#[test]
fn vector_moves_are_owned_only() {
    assert_eq!(
        BufWriter::from_vec(vec![0; 2], AllocationMode::Borrowed).err(),
        Some(WireBufError::UnsupportedAllocationMode(AllocationMode::Borrowed))
    );
    assert_eq!(
        BufReader::from_vec(vec![0; 2], AllocationMode::Borrowed).err(),
        Some(WireBufError::UnsupportedAllocationMode(AllocationMode::Borrowed))
    );

    let mut wr = BufWriter::from_vec(vec![0xFF; 4], AllocationMode::Owned).unwrap();
    wr.write_u8_safe(7).unwrap();
    assert_eq!(wr.into_vec(), vec![7]);
}

#[test]
fn borrowed_writer_into_vec_copies() {
    let mut buf = [0u8; 4];
    let mut wr = BufWriter::borrowed(&mut buf);
    wr.write_u8_safe(1).unwrap();
    wr.write_u8_safe(2).unwrap();
    assert_eq!(wr.to_vec(), vec![1, 2]);
    assert_eq!(wr.into_vec(), vec![1, 2]);
    assert_eq!(buf, [1, 2, 0, 0]);
}
