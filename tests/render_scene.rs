use std::fs;

use scene_tracer::output::save_picture;
use scene_tracer::picture::RGB8;
use scene_tracer::render::render_frame;
use scene_tracer::scene::{Scene, SceneError};

const LIT_SPHERE: &str = "\
# unit sphere lit from the camera position
size 41 31
output lit.png
camera 0 0 5  0 0 0  0 1 0  30
point 0 0 5 1 1 1
ambient 0 0 0
diffuse 1 1 1
sphere 0 0 0 1
";

#[test]
fn renders_a_scene_file_to_png() {
    let dir = tempfile::tempdir().unwrap();
    let scene_path = dir.path().join("lit.test");
    fs::write(&scene_path, LIT_SPHERE).unwrap();

    let scene = Scene::read_file(&scene_path).unwrap();
    assert_eq!(scene.objects.len(), 1);
    assert_eq!(scene.lights.len(), 1);

    let picture = render_frame(&scene);
    assert_eq!((picture.width(), picture.height()), (41, 31));
    assert_eq!(picture.as_bytes().len(), 41 * 31 * 3);

    let center = *picture.pixel_from_top(20, 15);
    assert!(center.r >= 250, "{:?}", center);
    assert_eq!(*picture.pixel_from_top(0, 0), RGB8::new(0, 0, 0));

    let image_path = dir.path().join(&scene.output);
    save_picture(&picture, &image_path).unwrap();
    let decoded = image::open(&image_path).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (41, 31));
    assert_eq!(decoded.get_pixel(20, 15).0, [center.r, center.g, center.b]);
}

#[test]
fn bad_lines_do_not_stop_the_render() {
    let source = format!("{}teapot 3\nsphere 2 2\npopTransform\n", LIT_SPHERE);
    let scene = Scene::parse(&source).unwrap();
    assert_eq!(scene.objects.len(), 1);
    let picture = render_frame(&scene);
    assert!(picture.pixel_from_top(20, 15).r >= 250);
}

#[test]
fn dangling_triangle_aborts_the_build() {
    let dir = tempfile::tempdir().unwrap();
    let scene_path = dir.path().join("broken.test");
    fs::write(&scene_path, "vertex 0 0 0\ntri 0 0 7\n").unwrap();
    assert!(matches!(Scene::read_file(&scene_path), Err(SceneError::VertexIndex { index: 7, .. })));
}

#[test]
fn bundled_scenes_load() {
    for name in ["scenes/spheres.test", "scenes/smooth.test"] {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(name);
        let scene = Scene::read_file(&path).unwrap();
        assert!(!scene.objects.is_empty(), "{}", name);
    }
}
