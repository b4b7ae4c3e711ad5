use std::io::{self, Read, Write};

use nbtrace::{
    decode_tree, dump, dump_to_string, render_tree, trace_root, NamedTag, NbtError, Summary,
    TagKind, Value, WindowBuffer,
};
use rstest::rstest;

/// Hands out at most `step` bytes per read, then optionally fails.
struct Trickle {
    data: Vec<u8>,
    pos: usize,
    step: usize,
    fail_at_end: bool,
}

impl Trickle {
    fn new(data: Vec<u8>, step: usize) -> Trickle {
        Trickle { data, pos: 0, step, fail_at_end: false }
    }
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos == self.data.len() && self.fail_at_end {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "source went away"));
        }
        let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// Accepts `budget` writes, then fails.
struct FullDisk {
    budget: usize,
}

impl Write for FullDisk {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.budget == 0 {
            return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        }
        self.budget -= 1;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn level() -> NamedTag {
    NamedTag::new(
        "",
        Value::Compound(vec![NamedTag::new(
            "Data",
            Value::Compound(vec![
                NamedTag::new("LevelName", Value::String("New World".into())),
                NamedTag::new("RandomSeed", Value::Long(-4_172_144_997_902_289_642)),
                NamedTag::new("SpawnY", Value::Int(64)),
                NamedTag::new("hardcore", Value::Byte(0)),
                NamedTag::new("rainTime", Value::Short(1)),
                NamedTag::new("BorderSize", Value::Double(59_999_968.0)),
                NamedTag::new(
                    "Rotation",
                    Value::List(TagKind::Float, vec![Value::Float(90.0), Value::Float(-12.5)]),
                ),
                NamedTag::new("Icon", Value::ByteArray(vec![0x89, b'P', b'N', b'G'])),
                NamedTag::new("Heights", Value::IntArray(vec![63, 64, -1])),
                NamedTag::new("States", Value::LongArray(vec![0x0123_4567_89ab_cdef])),
                NamedTag::new(
                    "Players",
                    Value::List(
                        TagKind::Compound,
                        vec![Value::Compound(vec![NamedTag::new("Health", Value::Float(20.0))])],
                    ),
                ),
                NamedTag::new("Tags", Value::List(TagKind::End, vec![])),
            ]),
        )]),
    )
}

const LEVEL_TRACE: &str = "\
TAG_Compound(\"\")
\tTAG_Compound(\"Data\")
\t\tTAG_String(\"LevelName\"): \"New World\"
\t\tTAG_Long(\"RandomSeed\"): -4172144997902289642 (0xc619903ab89c7516)
\t\tTAG_Int(\"SpawnY\"): 64 (0x00000040)
\t\tTAG_Byte(\"hardcore\"): 0 (0x00)
\t\tTAG_Short(\"rainTime\"): 1 (0x0001)
\t\tTAG_Double(\"BorderSize\"): 59999968.00 (0x418c9c3700000000)
\t\tTAG_List(\"Rotation\") 2 entries
\t\t\tTAG_Float: 90.00 (0x42b40000)
\t\t\tTAG_Float: -12.50 (0xc1480000)
\t\tTAG_Byte_Array(\"Icon\"): [0x89, 0x50, 0x4e, 0x47]
\t\tTAG_Int_Array(\"Heights\"): [0x0000003f, 0x00000040, 0xffffffff]
\t\tTAG_Long_Array(\"States\"): [0x0123456789abcdef]
\t\tTAG_List(\"Players\") 1 entries
\t\t\tTAG_Compound
\t\t\t\tTAG_Float(\"Health\"): 20.00 (0x41a00000)
\t\t\tTAG_End
\t\tTAG_List(\"Tags\") 0 entries
\tTAG_End
TAG_End
";

#[test]
fn level_trace() {
    let bytes = level().encode();
    assert_eq!(dump_to_string(&bytes).unwrap(), LEVEL_TRACE);
}

#[test]
fn streaming_and_tree_agree() {
    let tag = level();
    let bytes = tag.encode();

    let mut streamed = Vec::new();
    let summary = dump(&bytes[..], &mut streamed).unwrap();
    assert_eq!(summary, Summary { root: TagKind::Compound, consumed: bytes.len() as u64 });

    let decoded = decode_tree(&bytes).unwrap().unwrap();
    assert_eq!(decoded, tag);

    let mut rendered = Vec::new();
    render_tree(&decoded, &mut rendered).unwrap();
    assert_eq!(rendered, streamed);
}

#[test]
fn hollow_lists_agree_across_paths() {
    let tag = NamedTag::new(
        "",
        Value::Compound(vec![
            NamedTag::new("markers", Value::HollowList(TagKind::End, 3)),
            NamedTag::new("broken", Value::HollowList(TagKind::Short, -1)),
            NamedTag::new("after", Value::Byte(1)),
        ]),
    );
    let bytes = tag.encode();

    let mut streamed = Vec::new();
    let summary = dump(&bytes[..], &mut streamed).unwrap();
    assert_eq!(summary.consumed, bytes.len() as u64);
    assert_eq!(
        String::from_utf8(streamed.clone()).unwrap(),
        "TAG_Compound(\"\")\n\
         \tTAG_List(\"markers\") 3 entries\n\
         \tTAG_End\n\
         \tTAG_End\n\
         \tTAG_End\n\
         \tTAG_List(\"broken\") -1 entries\n\
         \tTAG_Byte(\"after\"): 1 (0x01)\n\
         TAG_End\n"
    );

    let decoded = decode_tree(&bytes).unwrap().unwrap();
    assert_eq!(decoded, tag);
    let mut rendered = Vec::new();
    render_tree(&decoded, &mut rendered).unwrap();
    assert_eq!(rendered, streamed);
}

#[rstest]
#[case::one_byte_reads(1, 16)]
#[case::odd_reads(7, 24)]
#[case::small_window(64, 32)]
#[case::default_window(4096, nbtrace::DEFAULT_CAPACITY)]
fn partial_reads_do_not_change_output(#[case] step: usize, #[case] capacity: usize) {
    let bytes = level().encode();
    let mut bb = WindowBuffer::with_capacity(Trickle::new(bytes.clone(), step), capacity);
    let mut out = Vec::new();

    let summary = trace_root(&mut bb, &mut out).unwrap();
    assert_eq!(summary.consumed, bytes.len() as u64);
    assert_eq!(String::from_utf8(out).unwrap(), LEVEL_TRACE);
}

#[test]
fn single_byte_compound() {
    let bytes = [0x0a, 0x00, 0x00, 0x01, 0x00, 0x01, b'x', 0x05, 0x00];
    let mut out = Vec::new();
    let summary = dump(&bytes[..], &mut out).unwrap();
    assert_eq!(summary.consumed, 9);
    assert_eq!(out, b"TAG_Compound(\"\")\n\tTAG_Byte(\"x\"): 5 (0x05)\nTAG_End\n");

    let tree = decode_tree(&bytes).unwrap().unwrap();
    assert_eq!(tree.value.get("x"), Some(&Value::Byte(5)));
}

#[test]
fn consumed_count_excludes_trailing_bytes() {
    let mut bytes = level().encode();
    let size = bytes.len() as u64;
    bytes.extend_from_slice(b"trailing garbage");
    let mut bb = WindowBuffer::new(&bytes[..]);
    let summary = trace_root(&mut bb, &mut io::sink()).unwrap();
    assert_eq!(summary.consumed, size);
    assert_eq!(bb.consumed(), size);
}

#[test]
fn two_roots_back_to_back() {
    let mut bytes = NamedTag::new("a", Value::Int(1)).encode();
    bytes.extend(NamedTag::new("b", Value::Short(2)).encode());
    let mut bb = WindowBuffer::new(&bytes[..]);
    let mut out = Vec::new();

    let first = trace_root(&mut bb, &mut out).unwrap();
    let second = trace_root(&mut bb, &mut out).unwrap();
    assert_eq!(first.consumed, 1 + 2 + 1 + 4);
    assert_eq!(second.consumed, 1 + 2 + 1 + 2);
    assert_eq!(bb.consumed(), first.consumed + second.consumed);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "TAG_Int(\"a\"): 1 (0x00000001)\nTAG_Short(\"b\"): 2 (0x0002)\n"
    );
}

#[test]
fn empty_structure() {
    assert_eq!(dump_to_string(&[0x00]).unwrap(), "");
    assert!(decode_tree(&[0x00]).unwrap().is_none());
    assert!(matches!(dump_to_string(&[]), Err(NbtError::UnexpectedEndOfStream { .. })));
}

#[test]
fn raw_bytes_pass_through() {
    let tag = NamedTag::new(&b"n\xff"[..], Value::String(b"caf\xe9".as_slice().into()));
    let mut out = Vec::new();
    dump(&tag.encode()[..], &mut out).unwrap();
    assert_eq!(out, b"TAG_String(\"n\xff\"): \"caf\xe9\"\n");
}

#[test]
fn max_length_string_fits_default_window() {
    let text = "z".repeat(u16::MAX as usize);
    let bytes = NamedTag::new("s", Value::String(text.as_str().into())).encode();
    let mut out = Vec::new();
    let summary = dump(&bytes[..], &mut out).unwrap();
    assert_eq!(summary.consumed, (1 + 2 + 1 + 2 + text.len()) as u64);
    assert_eq!(out.len(), "TAG_String(\"s\"): \"\"\n".len() + text.len());
}

#[test]
fn source_failure_mid_stream() {
    let bytes = level().encode();
    let cut = bytes.len() / 2;
    let mut source = Trickle::new(bytes[..cut].to_vec(), 5);
    source.fail_at_end = true;

    let mut bb = WindowBuffer::new(source);
    let mut out = Vec::new();
    let result = trace_root(&mut bb, &mut out);

    match result {
        Err(NbtError::SourceReadFailure(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("unexpected result: {:?}", other),
    }
    // The lines for the first half are already out, and they are whole lines.
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("TAG_Compound(\"\")\n\tTAG_Compound(\"Data\")\n"));
    assert!(text.ends_with('\n'));
    assert!(LEVEL_TRACE.starts_with(&text));
}

#[test]
fn sink_failure_is_reported() {
    let bytes = level().encode();
    let result = dump(&bytes[..], &mut FullDisk { budget: 3 });
    assert!(matches!(result, Err(NbtError::Output(e)) if e.kind() == io::ErrorKind::Other));
}
