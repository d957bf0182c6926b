//! Headless Bevy integration: the map lives in the world as a resource.

use bevy::prelude::*;

use crate::{config::MapGenConfig, map::Map};

/// The session's map, inserted once generation finishes.
#[derive(Resource, Debug)]
pub struct WorldMap(pub Map);

/// Generates the map from the `MapGenConfig` resource. A rejected config
/// leaves the world without a `WorldMap`.
pub fn generate_world_map(mut commands: Commands, config: Res<MapGenConfig>) {
    match Map::generate(&config) {
        Ok(map) => {
            tracing::info!(
                target: "hexmap::map",
                cols = map.geometry().cols(),
                rows = map.geometry().rows(),
                seed = map.seed(),
                "map.generated"
            );
            commands.insert_resource(WorldMap(map));
        }
        Err(err) => {
            tracing::error!(target: "hexmap::map", error = %err, "map.generation_failed");
        }
    }
}

/// Construct a Bevy [`App`] that generates the map on its first update.
pub fn build_headless_app(config: MapGenConfig) -> App {
    let mut app = App::new();
    app.insert_resource(config)
        .add_plugins(MinimalPlugins)
        .add_systems(Startup, generate_world_map);
    app
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_update_inserts_world_map() {
        let mut app = build_headless_app(MapGenConfig::new(3, 0x1234));
        assert!(app.world.get_resource::<WorldMap>().is_none());
        app.update();
        let map = &app.world.resource::<WorldMap>().0;
        assert_eq!(map.geometry().tile_count(), 64 * 64);
    }

    #[test]
    fn invalid_config_leaves_world_empty() {
        let mut config = MapGenConfig::new(3, 1);
        config.water_level = 0;
        let mut app = build_headless_app(config);
        app.update();
        assert!(app.world.get_resource::<WorldMap>().is_none());
    }
}
