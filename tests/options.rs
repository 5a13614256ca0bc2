use fixed_width::{
    DecodeOptions, Deserializer, EmptyCollection, EncodeOptions, ErrorKind, FixedRecord,
    LineEnding, SchemaBuilder,
};
use rstest::rstest;

#[derive(Debug, Default, PartialEq)]
struct Code {
    letters: String,
    digits: u16,
}

impl FixedRecord for Code {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema
            .field("letters", 0, 3)
            .bind(|r| r.letters.clone(), |r, v| r.letters = v);
        schema.field("digits", 1, 3).bind(|r| r.digits, |r, v| r.digits = v);
    }
}

#[derive(Debug, Default, PartialEq)]
struct Group {
    codes: Vec<Code>,
}

impl FixedRecord for Group {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.nested("codes", 0, |r| &r.codes, |r, v| r.codes = v);
    }
}

const INPUT: &str = "ABC001\nDEF002\nunmatched";

#[rstest]
fn empty_nested_collection_rejected_by_default() {
    let mut de = Deserializer::from_str(INPUT);
    let err = de.deserialize::<Vec<Group>>().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyCollection);
}

#[rstest]
#[case(true)]
#[case(false)]
fn allowed_empty_collection_ends_outer_loop(#[case] blank_composite_ends_collection: bool) {
    let options = DecodeOptions::new()
        .with_empty_collection(EmptyCollection::Allow)
        .with_blank_composite_ends_collection(blank_composite_ends_collection);
    let mut de = Deserializer::from_str_with_options(INPUT, options);

    let groups: Vec<Group> = de.deserialize().unwrap().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].codes.len(), 2);
    assert_eq!(de.cursor().peek().unwrap(), Some("unmatched"));
}

#[rstest]
fn crlf_output() {
    let codes = vec![
        Code {
            letters: "ABC".into(),
            digits: 1,
        },
        Code {
            letters: "DEF".into(),
            digits: 2,
        },
    ];
    let options = EncodeOptions::new().with_line_ending(LineEnding::CrLf);
    let text = fixed_width::to_string_with_options(&codes, &options).unwrap();
    assert_eq!(text, "ABC001\r\nDEF002");

    let back: Vec<Code> = fixed_width::from_str(&text).unwrap();
    assert_eq!(back, codes);
}

#[rstest]
fn parallel_threshold_does_not_change_output() {
    let codes: Vec<Code> = (0..500)
        .map(|n| Code {
            letters: "ROW".into(),
            digits: n,
        })
        .collect();
    let serial = fixed_width::to_string_with_options(
        &codes,
        &EncodeOptions::new().with_parallel_threshold(usize::MAX),
    )
    .unwrap();
    let eager =
        fixed_width::to_string_with_options(&codes, &EncodeOptions::new().with_parallel_threshold(1))
            .unwrap();
    assert_eq!(serial, eager);
    assert_eq!(serial.lines().count(), 500);
}

#[rstest]
fn overflow_inside_large_sequence_is_reported() {
    let mut codes: Vec<Code> = (0..300)
        .map(|n| Code {
            letters: "ROW".into(),
            digits: n,
        })
        .collect();
    codes[150].digits = 1500;
    let err = fixed_width::to_string_with_options(
        &codes,
        &EncodeOptions::new().with_parallel_threshold(2),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Overflow);
}
