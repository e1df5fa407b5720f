use super::*;

#[test]
fn test_root_has_no_parent() {
    assert_eq!(Tile::ROOT.parent(), None);
}

#[test]
fn test_parent_of_z1_tiles_is_root() {
    for child in Tile::ROOT.children() {
        assert_eq!(child.parent(), Some(Tile::ROOT));
    }
}

#[test]
fn test_children_canonical_order() {
    let tile = Tile::new(2, 1, 3).unwrap();
    let children = tile.children();
    assert_eq!(children[0], Tile { z: 3, x: 2, y: 6 });
    assert_eq!(children[1], Tile { z: 3, x: 3, y: 6 });
    assert_eq!(children[2], Tile { z: 3, x: 2, y: 7 });
    assert_eq!(children[3], Tile { z: 3, x: 3, y: 7 });
}

#[test]
fn test_parent_is_inverse_of_children() {
    // For a spread of tiles across zoom levels, every child's parent is
    // the tile it came from, and the parent's children contain the child.
    for (z, x, y) in [(0u8, 0u32, 0u32), (3, 5, 2), (7, 100, 77), (9, 511, 0)] {
        let tile = Tile::new(z, x, y).unwrap();
        for child in tile.children() {
            assert_eq!(child.parent(), Some(tile));
            assert!(tile.children().contains(&child));
        }
    }
}

#[test]
fn test_new_rejects_out_of_range_coordinates() {
    assert!(matches!(
        Tile::new(0, 1, 0),
        Err(TileError::OutOfRange { .. })
    ));
    assert!(matches!(
        Tile::new(3, 0, 8),
        Err(TileError::OutOfRange { .. })
    ));
    assert!(Tile::new(3, 7, 7).is_ok());
}

#[test]
fn test_new_rejects_excessive_zoom() {
    assert!(matches!(
        Tile::new(MAX_ZOOM_LIMIT + 1, 0, 0),
        Err(TileError::InvalidZoom(_))
    ));
}

#[test]
fn test_root_bounds_cover_mercator_world() {
    let b = Tile::ROOT.bounds();
    assert_eq!(b.west, -180.0);
    assert_eq!(b.east, 180.0);
    // Web Mercator latitude clamp
    assert!((b.north - 85.05112877980659).abs() < 1e-9);
    assert!((b.south + 85.05112877980659).abs() < 1e-9);
}

#[test]
fn test_z1_northwest_quadrant_bounds() {
    let b = Tile::new(1, 0, 0).unwrap().bounds();
    assert_eq!(b.west, -180.0);
    assert_eq!(b.east, 0.0);
    assert_eq!(b.south, 0.0);
    assert!((b.north - 85.05112877980659).abs() < 1e-9);
}

#[test]
fn test_children_bounds_tile_the_parent() {
    let tile = Tile::new(4, 8, 5).unwrap();
    let parent_bounds = tile.bounds();
    let children = tile.children();

    // Northwest child shares the parent's west/north edges; southeast
    // child shares the east/south edges.
    assert_eq!(children[0].bounds().west, parent_bounds.west);
    assert_eq!(children[0].bounds().north, parent_bounds.north);
    assert_eq!(children[3].bounds().east, parent_bounds.east);
    assert_eq!(children[3].bounds().south, parent_bounds.south);

    // Siblings meet exactly at the shared meridian.
    assert_eq!(children[0].bounds().east, children[1].bounds().west);
    assert_eq!(children[0].bounds().south, children[2].bounds().north);
}

#[test]
fn test_bounds_are_reproducible() {
    let tile = Tile::new(9, 270, 176).unwrap();
    assert_eq!(tile.bounds(), tile.bounds());
}

#[test]
fn test_file_stem_and_display() {
    let tile = Tile::new(9, 270, 176).unwrap();
    assert_eq!(tile.file_stem(), "9_270_176");
    assert_eq!(tile.to_string(), "9/270/176");
}

#[test]
fn test_bounding_box_display_matches_osmconvert_order() {
    let b = Tile::new(1, 0, 0).unwrap().bounds();
    let formatted = b.to_string();
    let parts: Vec<&str> = formatted.split(',').collect();
    assert_eq!(parts.len(), 4);
    assert_eq!(parts[0], "-180");
    assert_eq!(parts[2], "0");
}
