use criterion::{criterion_group, criterion_main, Criterion};

use stql_ast::expr::factory::*;
use stql_ast::sugar;
use stql_frames::{BoundingBox, Frame, Object};
use stql_monitor::OnlineMonitor;

fn formula() -> stql_ast::Expr {
    let body = exists(vec![object_var("car")], sugar::is_class("car", 1).unwrap()).unwrap();
    previous1(body).unwrap()
}

fn frame(n: u64) -> Frame {
    let mut f = Frame::new(n, n as f64 / 30.0, 1920, 1080);
    f.objects.insert(
        "car_1".into(),
        Object::new(1, 0.9, BoundingBox::new(100.0, 200.0, 50.0, 150.0)),
    );
    f
}

fn bench_evaluate(c: &mut Criterion) {
    c.bench_function("online_monitor_evaluate", |b| {
        b.iter(|| {
            let mut monitor = OnlineMonitor::new(formula(), 30.0).unwrap();
            for n in 0..1000 {
                monitor.evaluate(frame(n)).unwrap();
            }
        });
    });
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
