use crate::{
    Future, Result,
    cluster::{
        ClusterRouter, ClusterRouterBuilder, ConnectionTable, EndHandler, Endpoint,
        ExceptionHandler, NodeConnection, ReplyHandler, SlotMap, SlotRange,
    },
    resp::{Request, Response},
};
use futures_util::FutureExt;
use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Connection double with scripted replies.
///
/// `send` pops the front of the reply queue, answering `OK` when the
/// queue is empty; every routed request is recorded for assertions.
pub(crate) struct MockConnection {
    replies: Mutex<VecDeque<Result<Response>>>,
    batch_replies: Mutex<VecDeque<Result<Vec<Response>>>>,
    pub(crate) sent: Mutex<Vec<Request>>,
    pub(crate) batches: Mutex<Vec<Vec<Request>>>,
    pub(crate) close_count: AtomicUsize,
    pub(crate) pause_count: AtomicUsize,
    pub(crate) resume_count: AtomicUsize,
    pub(crate) demand: AtomicUsize,
    pub(crate) handlers_set: AtomicUsize,
    pending_full: bool,
}

impl MockConnection {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::new()),
            batch_replies: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            batches: Mutex::new(Vec::new()),
            close_count: AtomicUsize::new(0),
            pause_count: AtomicUsize::new(0),
            resume_count: AtomicUsize::new(0),
            demand: AtomicUsize::new(0),
            handlers_set: AtomicUsize::new(0),
            pending_full: false,
        })
    }

    pub(crate) fn with_pending_full() -> Arc<Self> {
        let mut connection = Self::new();
        Arc::get_mut(&mut connection).unwrap().pending_full = true;
        connection
    }

    pub(crate) fn push_reply(&self, reply: Result<Response>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub(crate) fn push_error_reply(&self, error_text: &str) {
        self.push_reply(Ok(Response::Error(error_text.into())));
    }

    pub(crate) fn push_batch_reply(&self, replies: Result<Vec<Response>>) {
        self.batch_replies.lock().unwrap().push_back(replies);
    }

    pub(crate) fn sent_names(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|request| request.name_uppercase())
            .collect()
    }

    pub(crate) fn num_sent(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub(crate) fn num_batches(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

impl NodeConnection for MockConnection {
    fn send(&self, request: Request) -> Future<'_, Response> {
        self.sent.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Response::ok()));
        async move { reply }.boxed()
    }

    fn send_batch(&self, requests: Vec<Request>) -> Future<'_, Vec<Response>> {
        let num_requests = requests.len();
        self.batches.lock().unwrap().push(requests);
        let replies = self
            .batch_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(vec![Response::ok(); num_requests]));
        async move { replies }.boxed()
    }

    fn pause(&self) {
        self.pause_count.fetch_add(1, Ordering::SeqCst);
    }

    fn resume(&self) {
        self.resume_count.fetch_add(1, Ordering::SeqCst);
    }

    fn fetch(&self, demand: usize) {
        self.demand.fetch_add(demand, Ordering::SeqCst);
    }

    fn set_reply_handler(&self, handler: Option<ReplyHandler>) {
        if handler.is_some() {
            self.handlers_set.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn set_exception_handler(&self, handler: Option<ExceptionHandler>) {
        if handler.is_some() {
            self.handlers_set.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn set_end_handler(&self, handler: Option<EndHandler>) {
        if handler.is_some() {
            self.handlers_set.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn pending_queue_full(&self) -> bool {
        self.pending_full
    }

    fn close(&self) -> Future<'_, ()> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        async move { Ok(()) }.boxed()
    }
}

pub(crate) fn endpoint(port: u16) -> Endpoint {
    Endpoint::from_host_port("127.0.0.1", port)
}

/// Three-shard topology used across the router tests:
/// slots 0-5460 on 7000 (replica 7003), 5461-10922 on 7001,
/// 10923-16383 on 7002.
///
/// Key placement facts the tests rely on: `bar` (5061) lands on 7000,
/// `{user1000}` (5474) on 7001, `foo` (12182) on 7002.
pub(crate) struct TestCluster {
    pub(crate) router: ClusterRouter,
    pub(crate) node0: Arc<MockConnection>,
    pub(crate) replica0: Arc<MockConnection>,
    pub(crate) node1: Arc<MockConnection>,
    pub(crate) node2: Arc<MockConnection>,
}

impl TestCluster {
    pub(crate) fn num_dispatches(&self) -> usize {
        self.node0.num_sent()
            + self.replica0.num_sent()
            + self.node1.num_sent()
            + self.node2.num_sent()
    }

    pub(crate) fn num_batches(&self) -> usize {
        self.node0.num_batches()
            + self.replica0.num_batches()
            + self.node1.num_batches()
            + self.node2.num_batches()
    }
}

pub(crate) fn test_slot_map() -> SlotMap {
    SlotMap::new(vec![
        SlotRange::new(0, 5460, [endpoint(7000), endpoint(7003)]),
        SlotRange::new(5461, 10922, [endpoint(7001)]),
        SlotRange::new(10923, 16383, [endpoint(7002)]),
    ])
    .unwrap()
}

pub(crate) fn test_cluster() -> TestCluster {
    test_cluster_with(|builder| builder)
}

pub(crate) fn test_cluster_with(
    customize: impl FnOnce(ClusterRouterBuilder) -> ClusterRouterBuilder,
) -> TestCluster {
    let _ = env_logger::builder().is_test(true).try_init();

    let node0 = MockConnection::new();
    let replica0 = MockConnection::new();
    let node1 = MockConnection::new();
    let node2 = MockConnection::new();

    let mut connections = ConnectionTable::new();
    connections.insert(endpoint(7000), node0.clone());
    connections.insert(endpoint(7003), replica0.clone());
    connections.insert(endpoint(7001), node1.clone());
    connections.insert(endpoint(7002), node2.clone());

    let router = customize(ClusterRouter::builder(test_slot_map(), connections)).build();

    TestCluster {
        router,
        node0,
        replica0,
        node1,
        node2,
    }
}
