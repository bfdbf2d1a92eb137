use plaza_domain::config::{
    ClientConfig, LoggingConfig, ScenesConfig, SettlementConfig, TimeoutPolicy,
};
use plaza_domain::features::KernelFeatures;
use plaza_domain::renderer::GameInstance;
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    assert_eq!(ScenesConfig::default().load_radius, 4);

    let settlement = SettlementConfig::default();
    assert_eq!(settlement.max_wait_ms, 15_000);
    assert_eq!(settlement.on_timeout, TimeoutPolicy::Settle);

    let logging = LoggingConfig::default();
    assert!(logging.console);
    assert_eq!(logging.level, "info");
    assert!(logging.path.is_none());

    let config = ClientConfig::default();
    assert!(!config.debug.editor);
    assert!(config.features.is_empty());
    assert!(config.catalog.scenes.is_empty());
}

#[test]
fn client_config_deserializes() {
    let raw = json!({
        "scenes": { "load_radius": 2 },
        "settlement": { "max_wait_ms": 500, "on_timeout": "wait" },
        "debug": { "editor": true, "show_fps": true },
        "features": ["avatar_lods", "explore_v2"],
        "spawn": { "parcel": { "x": -3, "y": 7 } },
        "catalog": { "scenes": [
            { "id": "plaza", "parcels": [{ "x": 0, "y": 0 }], "main": "game.js", "name": "Plaza" }
        ] }
    });

    let cfg: ClientConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.scenes.load_radius, 2);
    assert_eq!(cfg.settlement.on_timeout, TimeoutPolicy::Wait);
    assert!(cfg.debug.editor && cfg.debug.show_fps && !cfg.debug.debug);
    assert_eq!(cfg.features, KernelFeatures::AVATAR_LODS | KernelFeatures::EXPLORE_V2);
    assert_eq!(cfg.spawn.parcel.y, 7);
    assert_eq!(cfg.catalog.scenes[0].name, "Plaza");
    assert!(!cfg.catalog.scenes[0].is_global);
    assert_eq!(cfg.sandbox.capability_capacity, 64);
}

#[test]
fn kernel_config_uses_placeholders_for_unknown_versions() {
    let mut cfg = ClientConfig::default();
    cfg.features = KernelFeatures::AVATAR_LODS;

    let kernel = cfg.kernel_config(&GameInstance::default());
    assert_eq!(kernel.kernel_version, "unknown-kernel-version");
    assert_eq!(kernel.renderer_version, "unknown-renderer-version");
    assert_eq!(kernel.network, "mainnet");
    assert!(!kernel.comms.voice_chat_enabled);

    let value = serde_json::to_value(&kernel).unwrap();
    assert_eq!(value["features"]["enableAvatarLODs"], json!(true));
    assert_eq!(value["features"]["enableBuilderInWorld"], json!(false));
    assert_eq!(value["comms"]["commRadius"], json!(4));
    assert!(value.get("debugConfig").is_none());

    let game = GameInstance { name: "unity".into(), version: Some("1.2.3".into()) };
    assert_eq!(cfg.kernel_config(&game).renderer_version, "1.2.3");
}

#[test]
fn kernel_features_round_trip_as_names() {
    let features = KernelFeatures::from("builder_in_world") | KernelFeatures::from("bogus");
    assert_eq!(features, KernelFeatures::BUILDER_IN_WORLD);
    assert_eq!(serde_json::to_value(KernelFeatures::ALL).unwrap().as_array().unwrap().len(), 3);
}

#[test]
fn avatars_scene_is_global() {
    let mut config = ClientConfig::default();
    config.renderer.base_url = "https://client.example".into();

    let scene = config.avatars_scene();
    assert_eq!(scene.id.as_str(), "dcl-gs-avatars");
    assert_eq!(scene.name, "Avatars");
    assert_eq!(scene.base_url, "https://client.example");
    assert_eq!(scene.main, "hud.js");
    assert!(scene.is_global && scene.parcels.is_empty());
}
