use core_map::{build_headless_app, MapGenConfig, MapPresets, WorldMap};

#[test]
fn app_initializes() {
    let mut app = build_headless_app(MapGenConfig::new(3, 1));
    // first tick runs the startup schedule
    app.update();
    assert!(app.world.get_resource::<WorldMap>().is_some());
    app.update();
}

#[test]
fn every_builtin_preset_generates() {
    let presets = MapPresets::builtin();
    for id in presets.ids() {
        let preset = presets.get(id).expect("listed preset");
        let mut app = build_headless_app(preset.config(3, 0o1234));
        app.update();
        let map = &app.world.resource::<WorldMap>().0;
        assert_eq!(map.geometry().tile_count(), 64 * 64, "preset {id}");
    }
}
