use chrono::NaiveDate;
use fixed_width::codec::{DateCodec, MmDdYy, Pennies, Trimmed};
use fixed_width::schema::registry;
use fixed_width::{
    DecodeOptions, EmptyCollection, EncodeOptions, ErrorKind, FixedRecord, LineEnding, SchemaBuilder,
};
use rstest::rstest;

const FIXTURE: &str = include_str!("fixtures/positive_pay.txt");

#[derive(Debug, Default, PartialEq)]
struct PositivePayFile {
    header: FileHeader,
    check_groups: Vec<CheckGroup>,
}

impl FixedRecord for PositivePayFile {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.nested("header", 0, |r| &r.header, |r, v| r.header = v);
        schema.nested(
            "check_groups",
            1,
            |r| &r.check_groups,
            |r, v| r.check_groups = v,
        );
    }
}

#[derive(Debug, Default, PartialEq)]
struct FileHeader {
    bank_id: i32,
    account_number: i64,
}

impl FixedRecord for FileHeader {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.field("start", 0, 3).read_only(|_| "*03".to_string());
        schema
            .field("bank_id", 1, 5)
            .bind(|r| r.bank_id, |r, v| r.bank_id = v);
        schema
            .field("account_number", 2, 15)
            .bind(|r| r.account_number, |r, v| r.account_number = v);
        schema.field("always_zero", 3, 1).read_only(|_| 0u8);
    }
}

#[derive(Debug, Default, PartialEq)]
struct CheckRecord {
    check_serial: i64,
    issue_date: NaiveDate,
    account_number: i64,
    amount: f64,
    payee: String,
}

impl FixedRecord for CheckRecord {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema
            .field("check_serial", 0, 10)
            .pad(' ')
            .left()
            .truncate()
            .bind(|r| r.check_serial, |r, v| r.check_serial = v);
        schema
            .field("issue_date", 1, 6)
            .bind_with::<DateCodec<MmDdYy>>(|r| r.issue_date, |r, v| r.issue_date = v);
        schema
            .field("account_number", 2, 15)
            .bind(|r| r.account_number, |r, v| r.account_number = v);
        schema.field("transaction_code", 3, 3).read_only(|_| 320u16);
        schema
            .field("amount", 4, 10)
            .bind_with::<Pennies>(|r| r.amount, |r, v| r.amount = v);
        schema
            .field("payee", 5, 41)
            .pad(' ')
            .left()
            .bind_with::<Trimmed>(|r| r.payee.clone(), |r, v| r.payee = v);
    }
}

#[derive(Debug, Default, PartialEq)]
struct CheckGroup {
    records: Vec<CheckRecord>,
    trailer: CheckGroupTrailer,
}

impl FixedRecord for CheckGroup {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.nested("records", 0, |r| &r.records, |r, v| r.records = v);
        schema.nested("trailer", 1, |r| &r.trailer, |r, v| r.trailer = v);
    }
}

#[derive(Debug, Default, PartialEq)]
struct CheckGroupTrailer {
    record_count: u32,
    total_amount: f64,
}

impl FixedRecord for CheckGroupTrailer {
    fn describe(schema: &mut SchemaBuilder<Self>) {
        schema.pattern("^&");
        schema
            .field("start", 0, 15)
            .pad(' ')
            .left()
            .read_only(|_| "&".to_string());
        schema
            .field("record_count", 1, 5)
            .bind(|r| r.record_count, |r, v| r.record_count = v);
        schema
            .field("total_amount", 3, 10)
            .bind_with::<Pennies>(|r| r.total_amount, |r, v| r.total_amount = v);
        schema
            .field("spacer", 2, 3)
            .pad(' ')
            .read_only(|_| String::new());
        schema
            .field("spacer", 4, 47)
            .pad(' ')
            .read_only(|_| String::new());
    }
}

fn check(serial: i64, day: u32, amount: f64, payee: &str) -> CheckRecord {
    CheckRecord {
        check_serial: serial,
        issue_date: NaiveDate::from_ymd_opt(2020, 2, day).unwrap(),
        account_number: 5555333111,
        amount,
        payee: payee.to_string(),
    }
}

fn group(records: Vec<CheckRecord>) -> CheckGroup {
    let total_amount = records.iter().map(|r| r.amount).sum();
    CheckGroup {
        trailer: CheckGroupTrailer {
            record_count: records.len() as u32,
            total_amount,
        },
        records,
    }
}

fn sample_file() -> PositivePayFile {
    PositivePayFile {
        header: FileHeader {
            bank_id: 164,
            account_number: 5555333111,
        },
        check_groups: vec![group(vec![check(19983, 3, 1050.00, "T & T TESTPAYEE, L.P")])],
    }
}

#[rstest]
fn deserializes_bank_file() {
    let file: PositivePayFile = fixed_width::from_str(FIXTURE).unwrap();
    assert_eq!(file, sample_file());
}

#[rstest]
fn serializes_bank_file_byte_for_byte() {
    let options = EncodeOptions::new().with_line_ending(LineEnding::CrLf);
    let text = fixed_width::to_string_with_options(&sample_file(), &options).unwrap();
    assert_eq!(text, FIXTURE.trim_end_matches("\r\n"));
}

#[rstest]
fn reads_from_byte_stream() {
    let file: PositivePayFile = fixed_width::from_reader(FIXTURE.as_bytes()).unwrap();
    assert_eq!(file.check_groups[0].records[0].payee, "T & T TESTPAYEE, L.P");

    let file: PositivePayFile = fixed_width::from_slice(FIXTURE.as_bytes()).unwrap();
    assert_eq!(file.header.bank_id, 164);
}

#[rstest]
fn round_trips_several_groups() {
    let file = PositivePayFile {
        header: sample_file().header,
        check_groups: vec![
            group(vec![
                check(1, 3, 10.25, "ALPHA"),
                check(2, 4, 99.75, "BETA"),
                check(3, 5, 0.5, "GAMMA"),
            ]),
            group(vec![check(4, 6, 1500.00, "DELTA")]),
        ],
    };

    let text = fixed_width::to_string(&file).unwrap();
    assert_eq!(text.lines().count(), 1 + 4 + 2);

    let back: PositivePayFile = fixed_width::from_str(&text).unwrap();
    assert_eq!(back, file);
}

#[rstest]
fn group_without_checks_is_rejected_by_default() {
    let header = FIXTURE.lines().next().unwrap().trim_end_matches('\r');
    let trailer = FIXTURE.lines().nth(2).unwrap().trim_end_matches('\r');
    let input = format!("{header}\n{trailer}");

    let err = fixed_width::from_str::<PositivePayFile>(&input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyCollection);
}

#[rstest]
fn bad_header_reports_first_line() {
    let input = FIXTURE.replacen("*0300164", "*03001X4", 1);
    let err = fixed_width::from_str::<PositivePayFile>(&input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FieldDecode);
    assert_eq!(err.line(), Some(1));
}

#[rstest]
fn trailing_garbage_after_last_group() {
    let input = format!("{FIXTURE}junk");

    // The next group attempt finds no checks at all.
    let err = fixed_width::from_str::<PositivePayFile>(&input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyCollection);

    let options = DecodeOptions::new().with_empty_collection(EmptyCollection::Allow);
    let file = fixed_width::from_str_with_options::<PositivePayFile>(&input, &options).unwrap();
    assert_eq!(file.check_groups.len(), 1);

    let options = options.with_deny_trailing_lines(true);
    let err = fixed_width::from_str_with_options::<PositivePayFile>(&input, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TrailingLines);
    assert_eq!(err.line(), Some(4));
}

#[rstest]
fn schemas_are_memoized() {
    let first = registry::schema::<CheckRecord>().unwrap();
    let _: PositivePayFile = fixed_width::from_str(FIXTURE).unwrap();
    let second = registry::schema::<CheckRecord>().unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(second.total_width(), 85);
    assert!(registry::cached_schemas() >= 5);
}
