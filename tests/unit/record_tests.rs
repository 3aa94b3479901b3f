//! Unit tests for the record types built from individual report elements

use roxmltree::Document;

use valparse::{
    Arguments, Category, ErrorKind, FatalSignal, Frame, ParseError, Status, Suppression,
    SuppressionFrame, ValgrindError,
};

fn parse_error(xml: &str) -> valparse::Result<ValgrindError> {
    let doc = Document::parse(xml).unwrap();
    ValgrindError::from_element(doc.root_element())
}

#[test]
fn test_leak_record_with_xwhat() {
    let leak = parse_error(
        r#"<error>
  <unique>0x5</unique>
  <tid>1</tid>
  <kind>Leak_PossiblyLost</kind>
  <xwhat>
    <text>304 bytes in 1 blocks are possibly lost in loss record 1 of 1</text>
    <leakedbytes>304</leakedbytes>
    <leakedblocks>1</leakedblocks>
  </xwhat>
  <stack>
    <frame><ip>0x4C2FB55</ip><obj>/usr/lib/valgrind/vgpreload_memcheck-amd64-linux.so</obj><fn>calloc</fn></frame>
    <frame><ip>0x4012E54</ip><fn>allocate_dtv</fn><dir>/build/glibc/elf</dir><file>dl-tls.c</file><line>322</line></frame>
  </stack>
</error>"#,
    )
    .unwrap();

    assert_eq!(leak.kind, ErrorKind::LeakPossiblyLost);
    assert_eq!(leak.category(), Category::Leak);
    assert!(leak.is_leak());
    assert_eq!(leak.bytes_leaked, 304);
    assert_eq!(leak.blocks_leaked, 1);
    assert_eq!(leak.stack.len(), 2);
    assert_eq!(leak.stack[1].location().as_deref(), Some("dl-tls.c:322"));

    let text = leak.to_string();
    assert!(text.starts_with("Leak kind: Leak_PossiblyLost\n"));
    assert!(text.contains("Leaked: 304 bytes in 1 blocks"));
}

#[test]
fn test_error_without_message_is_rejected() {
    let result = parse_error("<error><kind>InvalidWrite</kind></error>");
    assert!(matches!(result, Err(ParseError::Format(_))));
}

#[test]
fn test_bad_leak_count_is_rejected() {
    let result = parse_error(
        "<error><kind>Leak_DefinitelyLost</kind>\
         <xwhat><text>lost</text><leakedbytes>many</leakedbytes></xwhat></error>",
    );
    let err = result.unwrap_err();
    assert!(err.to_string().contains("leakedbytes"));
}

#[test]
fn test_arguments_require_both_command_lines() {
    let doc = Document::parse("<args><vargv><exe>valgrind</exe></vargv></args>").unwrap();
    let err = Arguments::from_element(doc.root_element()).unwrap_err();
    assert_eq!(err.to_string(), "Format error: Invalid <args> format.");

    let doc = Document::parse("<args><vargv/><argv><exe>./a.out</exe></argv></args>").unwrap();
    let err = Arguments::from_element(doc.root_element()).unwrap_err();
    assert_eq!(err.to_string(), "Format error: Invalid <vargv> format.");
}

#[test]
fn test_status_needs_both_states() {
    let doc = Document::parse(
        "<r><status><state>RUNNING</state><time>1</time></status>\
         <status><state>RUNNING</state><time>2</time></status></r>",
    )
    .unwrap();
    let statuses: Vec<_> = doc.root_element().children().collect();
    assert!(Status::from_elements(&statuses).is_err());

    assert!(Status::from_elements(&statuses[..1]).is_err());
}

#[test]
fn test_fatal_signal_requires_signame() {
    let doc = Document::parse(
        "<fatal_signal><tid>1</tid><signo>11</signo><sicode>1</sicode>\
         <siaddr>0x0</siaddr></fatal_signal>",
    )
    .unwrap();
    let err = FatalSignal::from_element(doc.root_element()).unwrap_err();
    assert!(err.to_string().contains("signame"));
}

#[test]
fn test_frame_requires_ip() {
    let doc = Document::parse("<frame><fn>main</fn></frame>").unwrap();
    assert!(Frame::from_element(doc.root_element()).is_err());
}

#[test]
fn test_suppression_raw_text_prefers_function() {
    let supp = Suppression::new(
        "unused",
        "Memcheck:Cond",
        vec![
            SuppressionFrame {
                obj: Some("/lib/ld.so".to_string()),
                fun: Some("_dl_start".to_string()),
            },
            SuppressionFrame::object("/lib/libc.so.6"),
        ],
        None,
    );

    assert_eq!(
        supp.raw_text("ld-cond"),
        "{\n   <ld-cond>\n   Memcheck:Cond\n   fun:_dl_start\n   obj:/lib/libc.so.6\n}\n"
    );
}
