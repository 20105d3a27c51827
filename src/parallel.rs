use std::thread;
use std::sync::mpsc;
use std::sync::Arc;

use log::{ debug, info };

use crate::scene::Scene;
use crate::sink::DisplaySink;
use crate::error::{ Result, TracerError };
use crate::protocol::{ PixelRequest, PixelResponse, pixel_requests };

pub enum Message {
    /// Shade every listed pixel and send back one response per pixel.
    Pixels(Vec<PixelRequest>),

    /// No more work is coming; exit the worker loop.
    Terminate,
}

struct Worker {
    id: usize,
    sender: mpsc::Sender<Message>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(id: usize, scene: Arc<Scene>,
        results: mpsc::Sender<PixelResponse>) -> Result<Worker> {
        let (sender, receiver) = mpsc::channel::<Message>();

        let thread = thread::Builder::new()
            .name(format!("pixel-worker-{}", id))
            .spawn(move || {
                // A closed channel means the pool is gone; stop either way.
                while let Ok(Message::Pixels(batch)) = receiver.recv() {
                    for req in batch {
                        let response = scene.color_at_pixel(req.x, req.y);

                        // The consumer stopped listening; nothing left to do.
                        if results.send(response).is_err() {
                            return;
                        }
                    }
                }
            })?;

        Ok(Worker { id, sender, thread: Some(thread) })
    }
}

/// A fixed pool of worker threads fed round-robin.
///
/// Each worker owns its own request channel, so job `i` always lands on
/// worker `i mod N`. Every worker reads the same immutable `Scene` and
/// writes responses into one shared results channel.
pub struct ThreadPool {
    workers: Vec<Worker>,
    next: usize,
}

impl ThreadPool {
    /// Spawns `size` workers. Fails with `InvalidConfig` if `size` is zero.
    pub fn new(size: usize, scene: Arc<Scene>,
        results: mpsc::Sender<PixelResponse>) -> Result<ThreadPool> {
        if size == 0 {
            return Err(TracerError::InvalidConfig(
                "the worker pool needs at least one thread".into()
            ));
        }

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            workers.push(Worker::new(
                id,
                Arc::clone(&scene),
                results.clone(),
            )?);
        }

        debug!("Spawned {} pixel workers", size);
        Ok(ThreadPool { workers, next: 0 })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Hands a batch of pixels to the next worker in turn.
    ///
    /// Returns the id of the worker that received it, or `WorkerGone` if
    /// that worker's thread has already exited.
    pub fn execute(&mut self, batch: Vec<PixelRequest>) -> Result<usize> {
        let worker = &self.workers[self.next % self.workers.len()];
        self.next += 1;

        worker.sender.send(Message::Pixels(batch))
            .map_err(|_| TracerError::WorkerGone { id: worker.id })?;

        Ok(worker.id)
    }

    /// Tells every worker to exit once its queue is drained.
    ///
    /// After this, the results channel closes as soon as the last worker
    /// exits, even if some worker died early.
    pub fn finish(&mut self) {
        for worker in self.workers.iter() {
            // A dead worker cannot be told to stop; that is fine.
            let _ = worker.sender.send(Message::Terminate);
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.finish();

        for worker in &mut self.workers {
            if let Some(thread) = worker.thread.take() {
                if thread.join().is_err() {
                    debug!("pixel worker {} panicked", worker.id);
                }
            }
        }
    }
}

/// Splits an image into row-major chunks of at most `batch` pixels.
///
/// Chunk `j` covers pixel indices `j * batch .. (j + 1) * batch`. With a
/// batch of one, every pixel is its own job.
pub fn pixel_batches(width: usize, height: usize, batch: usize)
    -> Vec<Vec<PixelRequest>> {
    let requests: Vec<PixelRequest> = pixel_requests(width, height).collect();

    requests.chunks(batch.max(1)).map(|c| c.to_vec()).collect()
}

/// Settings for a parallel render.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PoolSettings {
    /// Number of worker threads, at least 1.
    pub workers: usize,

    /// Pixels per message, at least 1.
    pub batch: usize,
}

impl Default for PoolSettings {
    fn default() -> PoolSettings {
        PoolSettings { workers: default_workers(), batch: 1 }
    }
}

/// The hardware parallelism, or 1 if it cannot be determined.
pub fn default_workers() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Renders a scene on a worker pool, streaming pixels into `sink`.
///
/// Pixels are enumerated in row-major order and dealt round-robin to the
/// workers. Responses are painted as they arrive, in whatever order the
/// workers produce them. Returns once exactly `width * height` responses
/// have been painted.
pub fn parallel_render(scene: Arc<Scene>, settings: PoolSettings,
    sink: &mut dyn DisplaySink) -> Result<usize> {
    if settings.batch == 0 {
        return Err(TracerError::InvalidConfig(
            "batch size must be at least 1".into()
        ));
    }

    let expected = scene.width() * scene.height();
    info!("Rendering {}x{} using {} threads (batch {})...",
        scene.width(), scene.height(), settings.workers, settings.batch);

    let (results, responses) = mpsc::channel();
    let mut pool = ThreadPool::new(settings.workers, scene.clone(), results)?;

    for batch in pixel_batches(scene.width(), scene.height(), settings.batch) {
        if let Err(e) = pool.execute(batch) {
            debug!("Stopped dispatching: {}", e);
            break;
        }
    }
    pool.finish();

    let mut received = 0;
    while received < expected {
        match responses.recv() {
            Ok(response) => {
                if let Err(e) = sink.paint(&response) {
                    // Closing the results channel makes every worker stop
                    // at its next send, so the pool joins quickly.
                    drop(responses);
                    drop(pool);
                    return Err(e);
                }
                received += 1;
            },
            Err(_) => break,
        }
    }

    drop(pool);

    if received < expected {
        return Err(TracerError::WorkerDisconnected { received, expected });
    }

    sink.finish()?;
    info!("...done.");
    Ok(received)
}

#[cfg(test)]
fn test_scene(width: usize, height: usize, samples: usize) -> Arc<Scene> {
    use crate::camera::Camera;
    use crate::matrix::Matrix4D;
    use crate::tuple::Tuple4D;
    use crate::world::World;

    let view = Matrix4D::view_transform(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
    ).unwrap();
    let camera = Camera::new(width, height, std::f64::consts::PI / 2.0, view)
        .unwrap();
    let scene = Scene::new(World::default_world().unwrap(), camera).unwrap()
        .with_samples(samples).unwrap();

    Arc::new(scene)
}

#[cfg(test)]
struct BrokenSink {
    painted: usize,
}

#[cfg(test)]
impl DisplaySink for BrokenSink {
    fn paint(&mut self, _pixel: &PixelResponse) -> Result<()> {
        self.painted += 1;
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into())
    }
}

#[cfg(test)]
#[derive(Default)]
struct Recorder {
    painted: Vec<PixelResponse>,
    finished: bool,
}

#[cfg(test)]
impl DisplaySink for Recorder {
    fn paint(&mut self, pixel: &PixelResponse) -> Result<()> {
        self.painted.push(*pixel);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

#[test]
fn batches_cover_the_image_in_row_major_order() {
    let batches = pixel_batches(4, 3, 5);
    let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();

    assert_eq!(sizes, vec![5, 5, 2]);
    assert_eq!((batches[1][0].x, batches[1][0].y), (1, 1));
    assert_eq!(pixel_batches(4, 3, 1).len(), 12);
}

#[test]
fn jobs_are_dealt_round_robin() {
    let (results, responses) = mpsc::channel();
    let mut pool = ThreadPool::new(3, test_scene(7, 1, 1), results).unwrap();

    let assigned: Vec<usize> = pixel_batches(7, 1, 1).into_iter()
        .map(|b| pool.execute(b).unwrap())
        .collect();
    pool.finish();

    assert_eq!(pool.size(), 3);
    assert_eq!(assigned, vec![0, 1, 2, 0, 1, 2, 0]);
    assert_eq!(responses.iter().take(7).count(), 7);
}

#[test]
fn empty_pool_is_rejected() {
    let (results, _responses) = mpsc::channel();

    assert!(ThreadPool::new(0, test_scene(2, 2, 1), results).is_err());
}

#[test]
fn every_pixel_arrives_exactly_once() {
    use std::collections::HashSet;

    for &workers in [1, 2, 3, 4, 7].iter() {
        for &batch in [1, 4, 100].iter() {
            let mut sink = Recorder::default();
            let settings = PoolSettings { workers, batch };
            let n = parallel_render(test_scene(9, 6, 1), settings, &mut sink)
                .unwrap();

            let unique: HashSet<(usize, usize)> =
                sink.painted.iter().map(|p| (p.x, p.y)).collect();

            assert_eq!(n, 54);
            assert_eq!(sink.painted.len(), 54);
            assert_eq!(unique.len(), 54);
            assert!(unique.iter().all(|&(x, y)| x < 9 && y < 6));
            assert!(sink.finished);
        }
    }
}

#[test]
fn parallel_render_matches_reference_render() {
    use crate::canvas::Canvas;

    let scene = test_scene(11, 11, 1);
    let reference = scene.camera().render(scene.world()).unwrap();

    let mut canvas = Canvas::new(11, 11);
    let settings = PoolSettings { workers: 4, batch: 1 };
    parallel_render(scene.clone(), settings, &mut canvas).unwrap();

    for y in 0..11 {
        for x in 0..11 {
            assert_eq!(canvas.read_pixel(x, y).unwrap().to_rgb8(),
                reference.read_pixel(x, y).unwrap().to_rgb8());
        }
    }

    assert_eq!(canvas.read_pixel(5, 5).unwrap().to_rgb8(),
        scene.world().color_at(&scene.camera().ray_for_pixel(5, 5).unwrap())
            .unwrap().to_rgb8());
}

#[test]
fn parallel_render_matches_sequential_render_with_samples() {
    use crate::canvas::Canvas;

    let scene = test_scene(8, 5, 3);

    let mut sequential = Canvas::new(8, 5);
    scene.render_sequential(&mut sequential).unwrap();

    let mut parallel = Canvas::new(8, 5);
    let settings = PoolSettings { workers: 3, batch: 2 };
    parallel_render(scene, settings, &mut parallel).unwrap();

    assert_eq!(parallel, sequential);
}

#[test]
fn zero_batch_is_rejected() {
    let mut sink = Recorder::default();
    let settings = PoolSettings { workers: 2, batch: 0 };

    assert!(parallel_render(test_scene(2, 2, 1), settings, &mut sink).is_err());
    assert!(sink.painted.is_empty());
}

#[test]
fn default_pool_has_a_worker() {
    assert!(PoolSettings::default().workers >= 1);
}

#[test]
fn failing_sink_stops_the_render() {
    let mut sink = BrokenSink { painted: 0 };
    let settings = PoolSettings { workers: 3, batch: 4 };
    let res = parallel_render(test_scene(40, 30, 1), settings, &mut sink);

    assert!(matches!(res, Err(TracerError::Io(_))));
    assert_eq!(sink.painted, 1);
}

#[test]
fn workers_exit_once_results_are_unwanted() {
    let (results, responses) = mpsc::channel();
    let mut pool = ThreadPool::new(1, test_scene(4, 4, 1), results).unwrap();
    drop(responses);

    // The worker quits on its first failed send; later jobs are refused.
    let mut refused = None;
    for batch in pixel_batches(4, 4, 1).into_iter().cycle().take(10_000) {
        if let Err(e) = pool.execute(batch) {
            refused = Some(e);
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(1));
    }

    assert!(matches!(refused, Some(TracerError::WorkerGone { id: 0 })));
}

#[test]
fn worker_colors_are_bit_identical_to_reference() {
    let scene = test_scene(11, 11, 1);
    let reference = scene.camera().render(scene.world()).unwrap();

    for y in 0..11 {
        for x in 0..11 {
            let got = scene.pixel_color(x, y);
            let want = reference.read_pixel(x, y).unwrap();

            assert_eq!(got.r.to_bits(), want.r.to_bits());
            assert_eq!(got.g.to_bits(), want.g.to_bits());
            assert_eq!(got.b.to_bits(), want.b.to_bits());
        }
    }
}
