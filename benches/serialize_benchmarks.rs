use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use glam::Vec3;

use prefab_engine::components::*;
use prefab_engine::{
    deserialize_value, instantiate, resolve, save_entity, serialize_value, InstantiateOptions,
    World,
};

fn transform_round_trip(c: &mut Criterion) {
    let transform = Transform {
        position: Vec3::new(1.0, 2.0, 3.0),
        rotation: Vec3::new(0.0, 45.0, 0.0),
        ..Default::default()
    };
    let desc = resolve::<Transform>();
    let doc = serialize_value(desc, &transform);

    c.bench_function("serialize_transform", |b| {
        b.iter(|| serialize_value(desc, black_box(&transform)))
    });
    c.bench_function("deserialize_transform", |b| {
        b.iter(|| {
            let mut out = Transform::default();
            deserialize_value(desc, black_box(&doc), &mut out).unwrap();
            out
        })
    });
}

fn instantiate_small_tree(c: &mut Criterion) {
    let mut world = World::new();
    register_std_components(&mut world);

    let root = world.spawn();
    world.insert(root, Name::new("root"));
    world.insert(root, Transform::default());
    for i in 0..4 {
        let child = world.spawn();
        world.insert(child, Name::new(format!("child{i}")));
        world.insert(child, Transform::default());
        set_parent(&mut world, child, root);
    }
    let doc = save_entity(&world, root).unwrap();

    c.bench_function("instantiate_five_entities", |b| {
        b.iter(|| instantiate(&mut world, black_box(&doc), &InstantiateOptions::default()))
    });
}

criterion_group!(benches, transform_round_trip, instantiate_small_tree);
criterion_main!(benches);
