use anyhow::Result;
use core_map::{Direction, Map, MapGenConfig, MapObject, Mineral};

fn open_ground(map: &Map, pos: core_map::MapPos) -> bool {
    !map.is_in_water(pos)
        && map.object(pos).is_none()
        && map.mineral(pos) == Mineral::None
        && map.resource_amount(pos) == 0
}

#[test]
fn snapshot_survives_encoding() -> Result<()> {
    let mut map = Map::generate(&MapGenConfig::new(3, 0o31415))?;
    let g = *map.geometry();
    let start = map
        .find_nearest(g.pos(32, 32), 9, |m, pos| {
            open_ground(m, pos)
                && open_ground(m, m.move_dir(pos, Direction::Right))
                && open_ground(m, g.move_n(pos, Direction::Right, 2))
        })
        .expect("open strip near the centre");

    let end = g.move_n(start, Direction::Right, 2);
    map.set_object(start, MapObject::Flag);
    map.set_object_index(start, 3);
    map.set_object(end, MapObject::Flag);
    map.set_object_index(end, 4);
    assert_eq!(
        map.place_road_segment(start, &[Direction::Right, Direction::Right])?,
        end
    );
    map.set_owner(start, 2);
    map.set_serf_index(end, 17);
    map.set_idle_serf(end, true);

    let snapshot = map.to_snapshot();
    let bytes = map_schema::encode_snapshot(&snapshot)?;
    let decoded = map_schema::decode_snapshot(&bytes)?;
    assert_eq!(decoded, snapshot);

    let mut restored = Map::from_snapshot(&decoded)?;
    assert_eq!(restored.landscape(), map.landscape());
    assert_eq!(restored.game_tiles(), map.game_tiles());
    assert_eq!(restored.seed(), map.seed());
    assert_eq!(restored.generator_name(), "classic");
    assert_eq!(restored.fingerprint(), map.fingerprint());

    let walked = restored.remove_road_segment(start, Direction::Right)?;
    assert_eq!(walked, vec![Direction::Right, Direction::Right]);
    assert!(restored.paths(start).is_empty());
    Ok(())
}

#[test]
fn json_export_carries_the_header() -> Result<()> {
    let map = Map::generate(&MapGenConfig::new(3, 77))?;
    let snapshot = map.to_snapshot();
    let json: serde_json::Value =
        serde_json::from_str(&map_schema::encode_snapshot_json(&snapshot)?)?;
    assert_eq!(json["header"]["cols"], 64);
    assert_eq!(json["header"]["rows"], 64);
    assert_eq!(json["header"]["seed"], 77);
    assert_eq!(json["header"]["hash"], snapshot.header.hash);
    Ok(())
}

#[test]
fn truncated_snapshot_is_rejected() -> Result<()> {
    let map = Map::generate(&MapGenConfig::new(3, 5))?;
    let mut snapshot = map.to_snapshot();
    snapshot.tiles.truncate(snapshot.tiles.len() - 8);
    assert!(Map::from_snapshot(&snapshot).is_err());
    Ok(())
}
