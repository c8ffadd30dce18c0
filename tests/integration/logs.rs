use super::super::*;
use dtn_aodv::logging::{self, *};
use dtn_aodv::message::Message;
use std::fs;

#[test]
fn route_events_are_logged() -> TestResult {
    let log_file = test_log_file("route_events_are_logged");
    let logger = logging::create_logger(&log_file, false)?;
    {
        let mut net = Network::new(
            &["S", "A", "D"],
            &[("S", "A"), ("A", "D")],
            RouterConfig::default(),
            &logger,
        )?;
        let data = Message::new_data(String::from("S"), String::from("D"), vec![1]);
        net.node_mut("S").host.add_message(data)?;
        net.run(6)?;
        net.unlink("A", "D");
    }
    //Dropping the last handle flushes the asynchronous drain
    drop(logger);

    let records = get_log_records_from_file(&log_file)?;
    let rreq = find_record_by_msg("Initiated RREQ", &records).expect("No RREQ record");
    assert_eq!(rreq.msg_id.as_ref().map(String::as_str), Some("RREQ_S_to_D_0"));
    assert_eq!(rreq.destination.as_ref().map(String::as_str), Some("D"));
    assert!(find_record_by_msg("Updating route", &records).is_some());
    assert!(find_record_by_msg("Broken route detected", &records).is_some());

    let delivered = records.iter().any(|r| {
        r.msg == "Handled message"
            && r.status.as_ref().map(String::as_str) == Some("ACCEPTED")
            && r.msg_type.as_ref().map(String::as_str) == Some("DATA")
    });
    assert!(delivered);

    fs::remove_file(&log_file)?;
    Ok(())
}
