use adc_builder::Document;
use adc_publisher::sinks::MemoryDelivery;
use adc_publisher::{handle, FanOut, Phase, Publisher, Sink, SinkHandle, FANOUT_VERSION};

fn member(memory: &MemoryDelivery, ready: bool) -> SinkHandle {
    let mut sink = Publisher::new(memory.clone());
    if ready {
        sink.initialize().unwrap();
    }
    handle(sink)
}

fn doc() -> Document {
    let doc = Document::new();
    doc.add("n", 1i8);
    doc
}

#[test]
fn partial_failure_counts_and_continues() {
    let records: Vec<MemoryDelivery> = (0..3).map(|_| MemoryDelivery::new()).collect();
    let mut fanout = FanOut::new();
    fanout.add(member(&records[0], true));
    fanout.add(member(&records[1], false));
    fanout.add(member(&records[2], true));

    assert_eq!(fanout.publish(&doc()), 1);
    assert_eq!(records[0].len(), 1);
    assert_eq!(records[1].len(), 0);
    assert_eq!(records[2].len(), 1);
}

#[test]
fn pause_and_resume_broadcast() {
    let memory = MemoryDelivery::new();
    let mut fanout = FanOut::new();
    fanout.add(member(&memory, true));
    fanout.add(member(&memory, true));

    fanout.pause();
    assert_eq!(fanout.publish(&doc()), 0);
    assert!(memory.is_empty());

    fanout.resume();
    assert_eq!(fanout.publish(&doc()), 0);
    assert_eq!(memory.len(), 2);
}

#[test]
fn duplicate_members_receive_every_document() {
    let memory = MemoryDelivery::new();
    let shared = member(&memory, true);
    let mut fanout = FanOut::new();
    fanout.add(shared.clone());
    fanout.add(shared);
    assert_eq!(fanout.len(), 2);
    assert_eq!(fanout.publish(&doc()), 0);
    assert_eq!(memory.len(), 2);
}

#[test]
fn terminate_finalizes_and_empties() {
    let sink = member(&MemoryDelivery::new(), true);
    let mut fanout = FanOut::new();
    fanout.add(sink.clone());

    fanout.terminate();
    assert!(fanout.is_empty());
    assert_eq!(sink.borrow().phase(), Phase::Unconfigured);

    fanout.add(member(&MemoryDelivery::new(), true));
    assert_eq!(fanout.publish(&doc()), 0);
    assert_eq!(fanout.version(), FANOUT_VERSION);
}

#[test]
fn busy_member_counts_as_failed() {
    let sink = member(&MemoryDelivery::new(), true);
    let mut fanout = FanOut::new();
    fanout.add(sink.clone());
    let _held = sink.borrow_mut();
    assert_eq!(fanout.publish(&doc()), 1);
}
