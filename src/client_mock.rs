use async_trait::async_trait;
use mockall::mock;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::models::calendar::CalendarBlock;
use crate::models::task::LeadTask;
use crate::providers::{CalendarSource, InviteRequest, InviteSink, ProviderError, TaskSource};

// Mocks for the three collaborator seams
mock! {
    pub TaskSourceClient {}

    #[async_trait]
    impl TaskSource for TaskSourceClient {
        async fn search(&self, query: &str) -> Result<Vec<LeadTask>, ProviderError>;
        async fn enrich(&self, task: LeadTask) -> Result<LeadTask, ProviderError>;
        async fn complete(&self, task_id: &str) -> Result<(), ProviderError>;
    }
}

mock! {
    pub CalendarSourceClient {}

    #[async_trait]
    impl CalendarSource for CalendarSourceClient {
        async fn find_blocks(&self, label_query: &str) -> Result<Vec<CalendarBlock>, ProviderError>;
    }
}

mock! {
    pub InviteSinkClient {}

    #[async_trait]
    impl InviteSink for InviteSinkClient {
        async fn create_invite(&self, request: &InviteRequest) -> Result<String, ProviderError>;
    }
}

// A simple in-memory store backing the mock providers
pub struct MockProviderStore {
    tasks: Mutex<Vec<LeadTask>>,
    blocks: Mutex<Vec<CalendarBlock>>,
    invites: Mutex<Vec<(String, InviteRequest)>>,
    completed: Mutex<HashSet<String>>,
    fail_invites_for: Mutex<HashSet<String>>,
    fail_completion_for: Mutex<HashSet<String>>,
}

impl MockProviderStore {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            blocks: Mutex::new(Vec::new()),
            invites: Mutex::new(Vec::new()),
            completed: Mutex::new(HashSet::new()),
            fail_invites_for: Mutex::new(HashSet::new()),
            fail_completion_for: Mutex::new(HashSet::new()),
        }
    }

    pub fn add_task(&self, task: LeadTask) {
        self.tasks.lock().unwrap().push(task);
    }

    pub fn add_block(&self, block: CalendarBlock) {
        self.blocks.lock().unwrap().push(block);
    }

    /// Make invite creation fail for this attendee email.
    pub fn fail_invites_for(&self, email: &str) {
        self.fail_invites_for.lock().unwrap().insert(email.to_string());
    }

    pub fn clear_invite_failures(&self) {
        self.fail_invites_for.lock().unwrap().clear();
    }

    /// Make task completion fail for this task id.
    pub fn fail_completion_for(&self, task_id: &str) {
        self.fail_completion_for
            .lock()
            .unwrap()
            .insert(task_id.to_string());
    }

    pub fn search_tasks(&self, query: &str) -> Vec<LeadTask> {
        let completed = self.completed.lock().unwrap();
        self.tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|task| task.text.contains(query) && !completed.contains(&task.id))
            .cloned()
            .collect()
    }

    pub fn search_blocks(&self, query: &str) -> Vec<CalendarBlock> {
        self.blocks
            .lock()
            .unwrap()
            .iter()
            .filter(|block| block.summary.contains(query))
            .cloned()
            .collect()
    }

    pub fn complete_task(&self, task_id: &str) -> bool {
        if self.fail_completion_for.lock().unwrap().contains(task_id) {
            return false;
        }
        self.completed.lock().unwrap().insert(task_id.to_string());
        true
    }

    pub fn is_completed(&self, task_id: &str) -> bool {
        self.completed.lock().unwrap().contains(task_id)
    }

    pub fn store_invite(&self, request: &InviteRequest) -> Option<String> {
        if self
            .fail_invites_for
            .lock()
            .unwrap()
            .contains(&request.attendee_email)
        {
            return None;
        }
        let invite_id = format!("evt_{}", rand::random::<u32>());
        self.invites
            .lock()
            .unwrap()
            .push((invite_id.clone(), request.clone()));
        Some(invite_id)
    }

    pub fn invite_count(&self) -> usize {
        self.invites.lock().unwrap().len()
    }

    /// Number of invites sent to one attendee email.
    pub fn invites_for(&self, email: &str) -> usize {
        self.invites
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, request)| request.attendee_email == email)
            .count()
    }

    pub fn invite_requests(&self) -> Vec<InviteRequest> {
        self.invites
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }
}

impl Default for MockProviderStore {
    fn default() -> Self {
        Self::new()
    }
}

// Helper function to wire all three mock providers to one shared store
pub fn setup_mock_providers() -> (
    MockTaskSourceClient,
    MockCalendarSourceClient,
    MockInviteSinkClient,
    Arc<MockProviderStore>,
) {
    let store = Arc::new(MockProviderStore::new());

    let mut tasks = MockTaskSourceClient::default();

    let store_ref = Arc::clone(&store);
    tasks
        .expect_search()
        .returning(move |query| Ok(store_ref.search_tasks(query)));

    // Mock tasks are stored fully enriched, so enrichment passes through
    tasks.expect_enrich().returning(|task| Ok(task));

    let store_ref = Arc::clone(&store);
    tasks.expect_complete().returning(move |task_id| {
        if store_ref.complete_task(task_id) {
            Ok(())
        } else {
            Err(ProviderError::Api {
                status: 503,
                message: format!("completion rejected for task {}", task_id),
            })
        }
    });

    let mut calendar = MockCalendarSourceClient::default();

    let store_ref = Arc::clone(&store);
    calendar
        .expect_find_blocks()
        .returning(move |query| Ok(store_ref.search_blocks(query)));

    let mut invites = MockInviteSinkClient::default();

    let store_ref = Arc::clone(&store);
    invites
        .expect_create_invite()
        .returning(move |request| match store_ref.store_invite(request) {
            Some(invite_id) => Ok(invite_id),
            None => Err(ProviderError::Api {
                status: 502,
                message: format!("calendar rejected invite for {}", request.attendee_email),
            }),
        });

    (tasks, calendar, invites, store)
}
