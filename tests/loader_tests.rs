use futures::channel::oneshot;
use futures::executor::block_on;
use futures::future::{self, BoxFuture};
use glam::Vec3;
use particle_morph::error::LoadError;
use particle_morph::loaders::{load_models, DecodedModel, ModelSource};
use std::collections::HashMap;
use std::sync::Mutex;
use std::task::Poll;

type Gate = oneshot::Receiver<Result<DecodedModel, String>>;

/// Each load waits until the test releases it
struct GatedSource {
    gates: Mutex<HashMap<String, Gate>>,
}

impl GatedSource {
    fn new(ids: &[&str]) -> (Self, HashMap<String, oneshot::Sender<Result<DecodedModel, String>>>) {
        let mut gates = HashMap::new();
        let mut releases = HashMap::new();
        for id in ids {
            let (tx, rx) = oneshot::channel();
            gates.insert(id.to_string(), rx);
            releases.insert(id.to_string(), tx);
        }
        (
            Self {
                gates: Mutex::new(gates),
            },
            releases,
        )
    }
}

impl ModelSource for GatedSource {
    fn load<'a>(&'a self, source_id: &'a str) -> BoxFuture<'a, Result<DecodedModel, LoadError>> {
        let gate = self.gates.lock().unwrap().remove(source_id);
        Box::pin(async move {
            let gate = gate.ok_or_else(|| LoadError::new(source_id, "unknown model"))?;
            match gate.await {
                Ok(Ok(model)) => Ok(model),
                Ok(Err(reason)) => Err(LoadError::new(source_id, reason)),
                Err(_) => Err(LoadError::new(source_id, "load abandoned")),
            }
        })
    }
}

async fn yield_once() {
    let mut yielded = false;
    future::poll_fn(|cx| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await
}

fn cloud(marker: f32, count: usize) -> DecodedModel {
    DecodedModel {
        sub_meshes: vec![(0..count).map(|i| Vec3::new(marker, i as f32, 0.0)).collect()],
        bounds: None,
    }
}

#[cfg(test)]
mod load_order_tests {
    use super::*;

    #[test]
    fn test_out_of_order_completion_keeps_input_order() {
        let ids = ["./hello.glb", "./someone.glb", "./cute.glb"];
        let (source, mut releases) = GatedSource::new(&ids);

        let driver = async move {
            for (id, marker) in [("./cute.glb", 2.0), ("./hello.glb", 0.0), ("./someone.glb", 1.0)] {
                let tx = releases.remove(id).unwrap();
                let _ = tx.send(Ok(cloud(marker, 3)));
                yield_once().await;
            }
        };

        let (batch, ()) = block_on(future::join(load_models(&source, &ids), driver));

        assert_eq!(batch.completion_order, vec![2, 0, 1]);

        let models = batch.all_loaded().unwrap();
        let names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["hello", "someone", "cute"]);
        for (i, model) in models.iter().enumerate() {
            assert_eq!(model.index, i);
            assert_eq!(model.positions[0].x, i as f32);
        }
    }

    #[test]
    fn test_failure_does_not_cancel_siblings() {
        let ids = ["a.glb", "b.glb", "c.glb"];
        let (source, mut releases) = GatedSource::new(&ids);

        let driver = async move {
            let _ = releases.remove("b.glb").unwrap().send(Err("corrupt header".to_string()));
            yield_once().await;
            let _ = releases.remove("c.glb").unwrap().send(Ok(cloud(2.0, 4)));
            yield_once().await;
            let _ = releases.remove("a.glb").unwrap().send(Ok(cloud(0.0, 2)));
        };

        let (batch, ()) = block_on(future::join(load_models(&source, &ids), driver));

        assert_eq!(batch.outcomes.len(), 3);
        assert!(batch.outcomes[0].is_ok());
        assert!(batch.outcomes[2].is_ok());

        let failures: Vec<_> = batch.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].source_id, "b.glb");

        let models = batch.into_models();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "a");
        assert_eq!(models[1].name, "c");
        assert_eq!(models[1].vertex_count(), 4);
    }

    #[test]
    fn test_all_loaded_reports_first_failure() {
        let ids = ["x.glb", "y.glb"];
        let (source, releases) = GatedSource::new(&ids);
        // Dropping the senders abandons both loads
        drop(releases);

        let batch = block_on(load_models(&source, &ids));

        let err = batch.all_loaded().unwrap_err();
        assert_eq!(err.source_id, "x.glb");
    }

    #[test]
    fn test_empty_input() {
        let (source, _releases) = GatedSource::new(&[]);
        let ids: [&str; 0] = [];

        let batch = block_on(load_models(&source, &ids));

        assert!(batch.outcomes.is_empty());
        assert!(batch.completion_order.is_empty());
    }
}
