//! Lifecycle properties of mixer and stream handles, checked against the
//! in-memory backend across every scope it exposes.

use soundctl_audio::{
    all_scopes, apply_mixer_op, apply_stream_op, list_cards, list_mixer_ids, list_mixers,
    list_stream_devices, run_mixer_ops, run_stream_ops, ErrorKind, MixerHandle, MockBackend,
    MockCard, MockElement, MockPcm, StreamHandle,
};
use soundctl_types::{
    CardSelector, ChannelSelector, MixerElementId, MixerOp, OpOutput, SampleFormat, StreamMode,
    StreamOp, StreamParams, StreamType, VolumeRange,
};

fn every_mixer(backend: &MockBackend) -> Vec<(CardSelector, MixerElementId)> {
    let mut out = Vec::new();
    for scope in all_scopes(backend).unwrap() {
        for id in list_mixer_ids(backend, &scope).unwrap() {
            out.push((scope.clone(), id));
        }
    }
    out
}

fn every_pcm(backend: &MockBackend) -> Vec<(StreamType, String)> {
    StreamType::ALL
        .iter()
        .flat_map(|&direction| {
            list_stream_devices(backend, direction)
                .unwrap()
                .into_iter()
                .map(move |name| (direction, name))
        })
        .collect()
}

#[test]
fn test_enumeration_is_total() {
    let backend = MockBackend::demo();

    let cards = list_cards(&backend).unwrap();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[1].id, "Headset");

    let scopes = all_scopes(&backend).unwrap();
    assert_eq!(scopes.len(), 3);
    assert_eq!(scopes[0], CardSelector::Default);

    for scope in &scopes {
        assert!(list_mixers(&backend, scope).is_ok(), "scope {scope}");
    }
    for direction in StreamType::ALL {
        assert!(!list_stream_devices(&backend, direction).unwrap().is_empty());
    }
}

#[test]
fn test_duplicate_element_names_are_listed_once_each() {
    let backend = MockBackend::demo();
    let names = list_mixers(&backend, &CardSelector::CardIndex(0)).unwrap();
    assert_eq!(names.iter().filter(|n| *n == "Capture").count(), 2);
}

#[test]
fn test_every_mixer_opens_and_closes() {
    let backend = MockBackend::demo();
    let mixers = every_mixer(&backend);
    assert!(!mixers.is_empty());

    for (scope, id) in mixers {
        let mut mixer = MixerHandle::open_element(&backend, &id, &scope).unwrap();
        assert!(mixer.is_open());

        for (op, result) in run_mixer_ops(&mut mixer, &MixerOp::readers()) {
            assert!(result.is_ok(), "{} on {id} in {scope}: {result:?}", op.name());
        }

        mixer.close().unwrap();
        assert!(!mixer.is_open());
    }
    assert_eq!(backend.held(), 0);
}

#[test]
fn test_every_pcm_opens_and_closes() {
    let backend = MockBackend::demo();

    for (direction, name) in every_pcm(&backend) {
        let scope = CardSelector::Device(name.clone());
        let mut stream = StreamHandle::open(&backend, direction, &scope).unwrap();

        for (op, result) in run_stream_ops(&mut stream, &StreamOp::readers()) {
            assert!(result.is_ok(), "{} on {name}: {result:?}", op.name());
        }
        assert_eq!(stream.stream_type().unwrap(), direction);
        assert_eq!(stream.stream_mode().unwrap(), StreamMode::Normal);

        stream.close().unwrap();
    }
    assert_eq!(backend.held(), 0);
}

#[test]
fn test_closed_mixer_rejects_every_op() {
    let backend = MockBackend::demo();

    for (scope, id) in every_mixer(&backend) {
        let mut mixer = MixerHandle::open_element(&backend, &id, &scope).unwrap();
        mixer.close().unwrap();
        let calls = backend.device_calls();

        for op in MixerOp::all() {
            let err = apply_mixer_op(&mut mixer, &op).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidState, "{} on {id}", op.name());
        }
        assert_eq!(mixer.close().unwrap_err().kind(), ErrorKind::InvalidState);
        assert_eq!(backend.device_calls(), calls, "closed handle reached the device");
    }
}

#[test]
fn test_closed_stream_rejects_every_op() {
    let backend = MockBackend::demo();

    for (direction, name) in every_pcm(&backend) {
        let scope = CardSelector::Device(name);
        let mut stream = StreamHandle::open(&backend, direction, &scope).unwrap();
        stream.close().unwrap();
        let calls = backend.device_calls();

        for op in StreamOp::calibration() {
            let err = apply_stream_op(&mut stream, &op).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidState, "{}", op.name());
        }
        assert_eq!(stream.params().unwrap_err().kind(), ErrorKind::InvalidState);
        assert_eq!(stream.close().unwrap_err().kind(), ErrorKind::InvalidState);
        assert_eq!(backend.device_calls(), calls);
    }
}

#[test]
fn test_calibration_on_default_playback() {
    let backend = MockBackend::demo();
    let mut stream =
        StreamHandle::open(&backend, StreamType::Playback, &CardSelector::Default).unwrap();

    let calibration = StreamOp::calibration();
    let results = run_stream_ops(&mut stream, &calibration);
    assert_eq!(results.len(), 7);
    for (op, result) in &results {
        assert!(result.is_ok(), "{}: {result:?}", op.name());
    }
    assert!(matches!(results[0].1, Ok(OpOutput::Integer(0))));
    assert!(matches!(results[1].1, Ok(OpOutput::Integer(0))));

    assert_eq!(stream.params().unwrap(), StreamParams::calibration());
    stream.close().unwrap();
}

#[test]
fn test_default_scope_master_scenario() {
    let backend = MockBackend::demo();
    let mut mixer = MixerHandle::open(&backend, "Master", &CardSelector::Default).unwrap();

    assert_eq!(mixer.card_name().unwrap(), "default");
    assert_eq!(mixer.mixer_name().unwrap(), "Master");
    assert_eq!(mixer.mixer_id().unwrap(), 0);
    assert_eq!(mixer.get_range(StreamType::Playback).unwrap(), VolumeRange::new(0, 87));
    assert_eq!(mixer.get_range(StreamType::Capture).unwrap(), VolumeRange::default());
    assert_eq!(mixer.get_enumerated_value().unwrap(), None);

    mixer
        .set_volume(0, ChannelSelector::All, StreamType::Playback)
        .unwrap();
    assert_eq!(mixer.get_volume(StreamType::Playback).unwrap(), vec![0, 0]);

    mixer.close().unwrap();
    assert_eq!(
        mixer.get_volume(StreamType::Playback).unwrap_err().kind(),
        ErrorKind::InvalidState
    );
}

#[test]
fn test_enumerated_element() {
    let backend = MockBackend::demo();
    let mixer = MixerHandle::open(&backend, "Input Source", &CardSelector::Default).unwrap();
    let value = mixer.get_enumerated_value().unwrap().unwrap();
    assert_eq!(value.current, "Rear Mic");
    assert_eq!(value.items.len(), 3);
    assert!(mixer.get_volume(StreamType::Playback).unwrap().is_empty());
}

#[test]
fn test_missing_element_is_unavailable() {
    let backend = MockBackend::demo();
    let err = MixerHandle::open(&backend, "Surround", &CardSelector::Default).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceUnavailable);

    let err = MixerHandle::open(&backend, "Master", &CardSelector::CardIndex(9)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceUnavailable);
}

#[test]
fn test_empty_host_has_nothing_to_open() {
    let backend = MockBackend::new();
    assert_eq!(all_scopes(&backend).unwrap(), vec![CardSelector::Default]);
    assert!(list_mixers(&backend, &CardSelector::Default).unwrap().is_empty());

    let err = MixerHandle::open(&backend, "Master", &CardSelector::Default).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceUnavailable);
    let err = StreamHandle::open(&backend, StreamType::Playback, &CardSelector::Default)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceUnavailable);
}

#[test]
fn test_busy_devices_are_unavailable() {
    let backend = MockBackend::demo();
    let headset = CardSelector::CardIndex(1);

    let mut mic = MixerHandle::open(&backend, "Mic", &headset).unwrap();
    let err = MixerHandle::open(&backend, "Mic", &headset).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceUnavailable);
    mic.close().unwrap();
    MixerHandle::open(&backend, "Mic", &headset).unwrap();

    let hw = CardSelector::Device("hw:CARD=Headset,DEV=0".into());
    let _capture = StreamHandle::open(&backend, StreamType::Capture, &hw).unwrap();
    let err = StreamHandle::open(&backend, StreamType::Capture, &hw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceUnavailable);

    // the other direction is a separate substream
    StreamHandle::open(&backend, StreamType::Playback, &hw).unwrap();
}

#[test]
fn test_rejected_initial_params_release_device() {
    let backend = MockBackend::demo();
    let hw = CardSelector::Device("hw:CARD=PCH,DEV=0".into());

    let err = StreamHandle::open_with(
        &backend,
        StreamType::Playback,
        StreamMode::NonBlock,
        &hw,
        StreamParams::calibration(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedParameter);
    assert_eq!(backend.held(), 0);
}

#[test]
fn test_hardware_rejects_channel_count() {
    let backend = MockBackend::demo();
    let hw = CardSelector::Device("hw:CARD=PCH,DEV=0".into());
    let mut stream = StreamHandle::open(&backend, StreamType::Playback, &hw).unwrap();

    let err = stream.set_channels(6).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedParameter);
    assert_eq!(stream.params().unwrap().channels, 2);
    assert!(stream.is_open());
}

#[test]
fn test_device_fault_surfaces_as_device_error() {
    let backend = MockBackend::demo();
    let mut mixer = MixerHandle::open(&backend, "PCM", &CardSelector::Default).unwrap();

    backend.inject_fault("Input/output error");
    let err = mixer.get_volume(StreamType::Playback).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceError);

    // the handle stays usable after a device error
    assert_eq!(mixer.get_volume(StreamType::Playback).unwrap(), vec![100, 100]);
    mixer.close().unwrap();
}

#[test]
fn test_custom_host() {
    let card = MockCard::new(3, "Loopback", "Loopback 1").element(
        MockElement::new("PCM", 0)
            .playback_volume(VolumeRange::new(-100, 100), 1, 0)
            .playback_switch(1),
    );
    let pcm = MockPcm::plug("hw:3", Some(3))
        .only(StreamType::Capture)
        .formats(&[SampleFormat::S8, SampleFormat::S16Le]);
    let backend = MockBackend::with_host(vec![card], vec![pcm]);

    let mixer = MixerHandle::open(&backend, "PCM", &CardSelector::CardIndex(3)).unwrap();
    assert_eq!(mixer.get_volume(StreamType::Playback).unwrap(), vec![50]);
    assert_eq!(mixer.card_name().unwrap(), "hw:3");

    assert!(list_stream_devices(&backend, StreamType::Playback).unwrap().is_empty());
    let mut stream = StreamHandle::open(
        &backend,
        StreamType::Capture,
        &CardSelector::Device("hw:3".into()),
    )
    .unwrap();
    assert_eq!(stream.set_format(SampleFormat::S8).unwrap(), SampleFormat::S8);
}

#[cfg(all(target_os = "linux", feature = "alsa"))]
mod hardware {
    use serial_test::serial;

    use super::*;

    #[test]
    #[ignore = "requires ALSA hardware"]
    #[serial]
    fn test_alsa_enumeration_and_handles() {
        let backend = soundctl_audio::AlsaBackend::new();

        for scope in all_scopes(&backend).unwrap() {
            for id in list_mixer_ids(&backend, &scope).unwrap() {
                let mut mixer = MixerHandle::open_element(&backend, &id, &scope)
                    .unwrap_or_else(|e| panic!("listed element {id} in {scope}: {e}"));
                for (_, result) in run_mixer_ops(&mut mixer, &MixerOp::readers()) {
                    assert!(result.is_ok());
                }
                mixer.close().unwrap();
                let err = apply_mixer_op(&mut mixer, &MixerOp::CardName).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InvalidState);
            }
        }
    }

    #[test]
    #[ignore = "requires ALSA hardware"]
    #[serial]
    fn test_alsa_default_playback_calibration() {
        let backend = soundctl_audio::AlsaBackend::new();
        let mut stream =
            StreamHandle::open(&backend, StreamType::Playback, &CardSelector::Default).unwrap();
        for (op, result) in run_stream_ops(&mut stream, &StreamOp::calibration()) {
            assert!(result.is_ok(), "{}: {result:?}", op.name());
        }
        stream.close().unwrap();
    }

    #[test]
    #[ignore = "requires ALSA hardware"]
    #[serial]
    fn test_alsa_rate_is_negotiated_to_nearest() {
        let backend = soundctl_audio::AlsaBackend::new();
        let mut stream =
            StreamHandle::open(&backend, StreamType::Playback, &CardSelector::Default).unwrap();

        // no device accepts exactly 47 kHz; the driver picks a neighbour
        let rate = stream.set_rate(47_000).unwrap();
        assert!(rate > 0);
        assert_eq!(stream.params().unwrap().rate, rate);
        stream.close().unwrap();
    }
}
