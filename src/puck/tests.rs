use std::cell::RefCell;
use std::rc::Rc;

use crate::gatt::MAX_VALUE_LEN;
use crate::sim::SimStack;

use super::*;

type Log = Rc<RefCell<Vec<Vec<u8>>>>;

fn uuid(s: &str) -> Uuid {
    Uuid::from_ascii(s).unwrap()
}

fn puck() -> Puck<SimStack> {
    Puck::new(SimStack::new(), Config::default())
}

fn hdl(p: &Puck<SimStack>, chr: &str) -> Handle {
    let id = p.characteristics().find(uuid(chr)).unwrap();
    p.characteristics().get(id).handle().unwrap()
}

/// Registers a callback on `chr` that records every write.
fn record(p: &mut Puck<SimStack>, chr: &str) -> Log {
    let log = Log::default();
    let l = Rc::clone(&log);
    p.on_characteristic_write(uuid(chr), move |_, v| l.borrow_mut().push(v.to_vec()));
    log
}

#[test]
fn init() {
    let mut p = puck();
    assert_eq!(p.state(), DeviceState::Connecting);
    assert!(p.beacon().is_none());
    p.add_characteristic(
        uuid("bftj light      "),
        uuid("bftj light color"),
        3,
        CharProps::default(),
    );
    p.init(0xC0FE).unwrap();
    assert_eq!(p.state(), DeviceState::Disconnected);

    let s = p.stack();
    assert!(s.is_initialized());
    assert!(!s.is_advertising());
    assert_eq!(s.device_name(), "Puck C0FE");

    let beacon = p.beacon().unwrap();
    assert_eq!(beacon.minor(), 0xC0FE);
    let mut ad = vec![0x02, 0x01, 0x06, 0x1A, 0xFF];
    ad.extend_from_slice(beacon.as_ref());
    assert_eq!(s.advertising_data(), ad.as_slice());

    let params = s.advertising_params().unwrap();
    assert_eq!(params.typ, AdvType::ConnectableUndirected);
    assert_eq!(params.interval_ticks(), Some(160));

    assert_eq!(s.services().len(), 1);
    assert_eq!(s.services()[0].uuid, uuid("bftj light      "));
    let h = hdl(&p, "bftj light color");
    assert_eq!(s.services()[0].chars, [(uuid("bftj light color"), h)]);
    assert_eq!(s.value(h), Some(&[0, 0, 0][..]));
}

#[test]
fn state_machine() {
    let mut p = puck();
    p.init(0x0001).unwrap();

    // Idle wakeups keep advertising without restarting it
    p.drive().unwrap();
    assert_eq!(p.state(), DeviceState::Advertising);
    assert!(p.stack().is_advertising());
    p.drive().unwrap();
    assert_eq!(p.state(), DeviceState::Advertising);

    p.stack_mut().push_event(Event::Connected);
    assert!(p.drive().unwrap());
    assert_eq!(p.state(), DeviceState::Connected);
    assert!(!p.stack().is_advertising());

    p.stack_mut().push_event(Event::Disconnected(
        DisconnectReason::RemoteUserTerminatedConnection,
    ));
    p.drive().unwrap();
    assert_eq!(p.state(), DeviceState::Disconnected);

    // Next iteration resumes advertising
    p.drive().unwrap();
    assert_eq!(p.state(), DeviceState::Advertising);
    assert!(p.stack().is_advertising());
}

#[test]
fn disconnected_from_any_state() {
    let mut p = puck();
    for state in [
        DeviceState::Connecting,
        DeviceState::Connected,
        DeviceState::Advertising,
        DeviceState::Disconnected,
    ] {
        p.set_state(state);
        p.handle_event(Event::Disconnected(DisconnectReason::ConnectionTimeout));
        assert_eq!(p.state(), DeviceState::Disconnected);
    }
}

#[test]
fn local_disconnect() {
    let mut p = puck();
    p.init(0x0001).unwrap();
    assert!(matches!(p.disconnect(), Err(Error::Stack(_))));

    p.stack_mut().push_event(Event::Connected);
    p.drive().unwrap();
    p.disconnect().unwrap();
    assert_eq!(p.state(), DeviceState::Connected);
    assert_eq!(
        p.stack().disconnects(),
        [DisconnectReason::LocalHostTerminatedConnection]
    );
    p.drive().unwrap();
    assert_eq!(p.state(), DeviceState::Disconnected);
}

#[test]
fn stop_advertising() {
    let mut p = puck();
    p.init(0x0001).unwrap();
    p.stop_advertising().unwrap();
    assert_eq!(p.state(), DeviceState::Disconnected);

    p.start_advertising().unwrap();
    assert!(matches!(p.start_advertising(), Err(Error::Stack(_))));
    assert_eq!(p.state(), DeviceState::Advertising);
    p.stop_advertising().unwrap();
    assert_eq!(p.state(), DeviceState::Disconnected);
    assert!(!p.stack().is_advertising());

    p.stack_mut().push_event(Event::Connected);
    p.drive().unwrap();
    p.stop_advertising().unwrap();
    assert_eq!(p.state(), DeviceState::Connected);
}

#[test]
fn write_cycle() {
    let mut p = puck();
    p.add_default_characteristic(uuid("switch service  "), uuid("switch state    "), 1);
    let log = record(&mut p, "switch state    ");
    p.init(0x0002).unwrap();
    let h = hdl(&p, "switch state    ");

    p.stack_mut().push_event(Event::Connected);
    p.drive().unwrap();
    assert_eq!(p.state(), DeviceState::Connected);
    assert!(log.borrow().is_empty());

    p.stack_mut().write(h, [0x07]);
    p.drive().unwrap();
    assert_eq!(*log.borrow(), [vec![0x07]]);
    assert_eq!(p.pending_callbacks(), 0);
    assert_eq!(p.characteristic_value(uuid("switch state    ")), Some(&[0x07][..]));
    assert_eq!(p.stack().value(h), Some(&[0x07][..]));

    // Idle wakeup does not rerun the callback
    p.drive().unwrap();
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn callbacks_are_deferred() {
    let mut p = puck();
    p.add_default_characteristic(uuid("switch service  "), uuid("switch state    "), 1);
    let log = record(&mut p, "switch state    ");
    p.init(0x0002).unwrap();
    let h = hdl(&p, "switch state    ");

    p.handle_event(Event::DataWritten {
        hdl: h,
        data: vec![1],
    });
    assert_eq!(p.pending_callbacks(), 1);
    assert!(log.borrow().is_empty());
    p.run_pending();
    assert_eq!(*log.borrow(), [vec![1]]);
}

#[test]
fn lifo_order() {
    let mut p = puck();
    let chr = uuid("switch state    ");
    p.add_default_characteristic(uuid("switch service  "), chr, 1);
    let log = Rc::new(RefCell::new(Vec::new()));
    for tag in [b'a', b'b'] {
        let l = Rc::clone(&log);
        p.on_characteristic_write(chr, move |_, v| l.borrow_mut().push((tag, v[0])));
    }
    p.init(0x0003).unwrap();
    let h = hdl(&p, "switch state    ");

    p.on_data_written(h, &[1]);
    p.on_data_written(h, &[2]);
    assert_eq!(p.pending_callbacks(), 4);
    p.run_pending();
    assert_eq!(
        *log.borrow(),
        [(b'b', 2), (b'a', 2), (b'b', 1), (b'a', 1)]
    );
}

#[test]
fn unknown_writes() {
    let mut p = puck();
    p.add_default_characteristic(uuid("switch service  "), uuid("switch state    "), 1);
    p.add_default_characteristic(uuid("switch service  "), uuid("no callbacks    "), 1);
    let log = record(&mut p, "switch state    ");
    p.init(0x0004).unwrap();

    p.on_data_written(Handle::new(0x00F0).unwrap(), &[1]);
    assert_eq!(p.pending_callbacks(), 0);

    // Value is still stored when no callbacks are registered
    let h = hdl(&p, "no callbacks    ");
    p.on_data_written(h, &[9]);
    assert_eq!(p.pending_callbacks(), 0);
    assert_eq!(p.characteristic_value(uuid("no callbacks    ")), Some(&[9][..]));
    assert!(log.borrow().is_empty());
}

#[test]
fn update_value() {
    let mut p = puck();
    let chr = uuid("temperature     ");
    p.add_characteristic(
        uuid("sensor service  "),
        chr,
        2,
        CharProps::READ | CharProps::NOTIFY,
    );

    // Before init there is no handle, so only the local copy changes
    p.update_characteristic_value(chr, &[1, 2]).unwrap();
    assert_eq!(p.characteristic_value(chr), Some(&[1, 2][..]));

    p.init(0x0005).unwrap();
    let h = hdl(&p, "temperature     ");
    assert_eq!(p.stack().value(h), Some(&[1, 2][..]));
    p.update_characteristic_value(chr, &[3, 4]).unwrap();
    assert_eq!(p.characteristic_value(chr), Some(&[3, 4][..]));
    assert_eq!(p.stack().notified(), [(h, vec![3, 4])]);

    // Stack rejects values longer than the characteristic
    assert!(matches!(
        p.update_characteristic_value(chr, &[1, 2, 3]),
        Err(Error::Stack(_))
    ));
    assert_eq!(p.characteristic_value(chr), Some(&[3, 4][..]));
}

#[test]
fn update_unknown() {
    let mut p = puck();
    p.add_default_characteristic(uuid("switch service  "), uuid("switch state    "), 1);
    p.init(0x0006).unwrap();
    p.update_characteristic_value(uuid("nothing here    "), &[1]).unwrap();
    assert!(p.stack().notified().is_empty());
    assert_eq!(p.characteristics().len(), 1);
    assert_eq!(p.characteristic_value(uuid("switch state    ")), Some(&[0][..]));
    assert_eq!(p.characteristic_value(uuid("nothing here    ")), None);
}

#[test]
fn reentrant_callback() {
    let mut p = puck();
    let (color, brightness) = (uuid("light color     "), uuid("light brightness"));
    p.add_default_characteristic(uuid("light service   "), color, 3);
    p.add_characteristic(
        uuid("light service   "),
        brightness,
        1,
        CharProps::READ | CharProps::NOTIFY,
    );
    p.on_characteristic_write(color, move |p: &mut Puck<SimStack>, v| {
        let max = v.iter().copied().max().unwrap_or_default();
        p.update_characteristic_value(brightness, &[max]).unwrap();
    });
    p.init(0x0007).unwrap();
    let (hc, hb) = (hdl(&p, "light color     "), hdl(&p, "light brightness"));

    p.stack_mut().push_event(Event::Connected);
    p.stack_mut().write(hc, [0x10, 0x80, 0x20]);
    p.drive().unwrap();
    p.drive().unwrap();
    assert_eq!(p.characteristic_value(brightness), Some(&[0x80][..]));
    assert_eq!(p.stack().notified(), [(hb, vec![0x80])]);
}

#[test]
fn service_rebuild() {
    let mut p = puck();
    let (s1, s2) = (uuid("service number 1"), uuid("service number 2"));
    let c1 = p.add_default_characteristic(s1, uuid("characteristic 1"), 1);
    let c2 = p.add_default_characteristic(s1, uuid("characteristic 2"), 2);
    let c3 = p.add_default_characteristic(s2, uuid("characteristic 3"), 3);
    assert_eq!(p.services().len(), 2);
    assert_eq!(p.services().get(s1).unwrap().chars(), &[c1, c2]);
    assert_eq!(p.services().get(s2).unwrap().chars(), &[c3]);

    p.init(0x0008).unwrap();
    let attached = p.stack().services();
    assert_eq!(attached.len(), 2);
    assert_eq!(attached[0].uuid, s1);
    let order: Vec<_> = attached[0].chars.iter().map(|&(u, _)| u).collect();
    assert_eq!(order, [uuid("characteristic 1"), uuid("characteristic 2")]);
    assert_eq!(attached[1].uuid, s2);
}

#[test]
fn add_after_init() {
    let mut p = puck();
    let svc = uuid("switch service  ");
    p.add_default_characteristic(svc, uuid("switch state    "), 1);
    p.init(0x0009).unwrap();
    let late = p.add_default_characteristic(svc, uuid("late addition   "), 1);
    assert_eq!(p.characteristics().get(late).handle(), None);
    assert_eq!(p.stack().services().len(), 1);
    assert_eq!(p.services().get(svc).unwrap().chars().len(), 2);
}

#[test]
fn default_props() {
    let cfg = Config {
        default_props: CharProps::READ | CharProps::WRITE_WITHOUT_RESPONSE,
        ..Config::default()
    };
    let mut p = Puck::new(SimStack::new(), cfg);
    let id = p.add_default_characteristic(uuid("switch service  "), uuid("switch state    "), 1);
    assert_eq!(
        p.characteristics().get(id).props(),
        CharProps::READ | CharProps::WRITE_WITHOUT_RESPONSE
    );
}

#[test]
#[should_panic]
fn value_too_long() {
    let mut p = puck();
    p.add_default_characteristic(
        uuid("switch service  "),
        uuid("switch state    "),
        MAX_VALUE_LEN + 1,
    );
}
