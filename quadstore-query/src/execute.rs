//! Query execution
//!
//! Matching is driven by an explicit LIFO work queue of [`MatchTask`]s. Each
//! task holds the statement patterns still to match and the bindings so far;
//! processing a task matches one pattern and pushes one child task per
//! successful unification.
//!
//! # Branches and junctions
//!
//! The top-level pattern and every OPTIONAL sub-pattern instance run as a
//! branch. A branch counts its outstanding tasks and completes when the count
//! reaches zero. When a branch has matched all its statements and its pattern
//! has optional sub-patterns, a junction is opened: one optional branch per
//! sub-pattern, seeded with the trunk bindings. Once every optional branch
//! has completed, the junction delivers the cross product of their results
//! merged over the trunk. An optional branch with no results contributes one
//! empty solution, so the trunk is never lost.
//!
//! # Suspension
//!
//! With a [`Fetcher`] attached, a task whose remaining patterns mention a
//! bound term from an unloaded document is parked until that document
//! settles. [`QueryExecution::run`] then returns
//! [`ExecutionStatus::Waiting`] once nothing else can make progress.

use crate::binding::Bindings;
use crate::error::{QueryError, Result};
use crate::fetch::{DocumentState, Fetcher};
use crate::pattern::{GraphPattern, Query};
use crate::plan::{prepare, reorder};
use crate::unify::unify_statement;
use quadstore_core::{Store, Term};
use rustc_hash::FxHashMap;

/// Receives solutions of the top-level pattern
pub trait MatchSink {
    fn on_match(&mut self, bindings: &Bindings);

    /// Called once, after the last solution
    fn on_done(&mut self) {}
}

impl<F> MatchSink for F
where
    F: FnMut(&Bindings),
{
    fn on_match(&mut self, bindings: &Bindings) {
        self(bindings)
    }
}

/// Sink collecting every solution
#[derive(Debug, Default)]
pub struct CollectSink {
    pub rows: Vec<Bindings>,
    pub done: bool,
}

impl MatchSink for CollectSink {
    fn on_match(&mut self, bindings: &Bindings) {
        self.rows.push(bindings.clone());
    }

    fn on_done(&mut self) {
        self.done = true;
    }
}

/// Outcome of a call to [`QueryExecution::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Every branch finished; `on_done` has been called
    Complete,
    /// Work is parked on these documents
    Waiting(Vec<Term>),
}

type BranchId = usize;
type JunctionId = usize;

#[derive(Debug, Clone, Copy)]
enum BranchOwner {
    Root,
    Optional(JunctionId),
}

#[derive(Debug)]
struct Branch<'q> {
    pattern: &'q GraphPattern,
    owner: BranchOwner,
    outstanding: usize,
    results: Vec<Bindings>,
}

#[derive(Debug)]
struct Junction {
    parent: BranchId,
    trunk: Bindings,
    branches: Vec<BranchId>,
    remaining: usize,
}

#[derive(Debug)]
struct MatchTask {
    branch: BranchId,
    remaining: Vec<usize>,
    bindings: Bindings,
}

#[derive(Debug)]
struct Parked {
    document: Term,
    tasks: Vec<MatchTask>,
}

enum DocumentCheck {
    Ready,
    Retry,
    Suspend(Term),
}

/// A resumable execution of one [`Query`]
#[derive(Debug)]
pub struct QueryExecution<'q> {
    query: &'q Query,
    branches: Vec<Branch<'q>>,
    junctions: Vec<Junction>,
    stack: Vec<MatchTask>,
    parked: FxHashMap<String, Parked>,
    fuel_used: u64,
    delivered: usize,
    complete: bool,
    aborted: bool,
}

impl<'q> QueryExecution<'q> {
    pub fn new(query: &'q Query) -> Self {
        let mut exec = Self {
            query,
            branches: Vec::new(),
            junctions: Vec::new(),
            stack: Vec::new(),
            parked: FxHashMap::default(),
            fuel_used: 0,
            delivered: 0,
            complete: false,
            aborted: false,
        };
        let root = exec.open_branch(&query.pattern, BranchOwner::Root);
        exec.spawn(MatchTask {
            branch: root,
            remaining: (0..query.pattern.len()).collect(),
            bindings: query.initial_bindings.clone(),
        });
        exec
    }

    /// Solutions delivered to the sink so far
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn fuel_used(&self) -> u64 {
        self.fuel_used
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Documents with parked work
    pub fn waiting_on(&self) -> Vec<Term> {
        let mut docs: Vec<Term> = self.parked.values().map(|p| p.document.clone()).collect();
        docs.sort();
        docs
    }

    /// Requeue the work parked on `document`
    ///
    /// Call after the document settled, then call [`QueryExecution::run`]
    /// again. Returns the number of tasks resumed.
    pub fn document_ready(&mut self, document: &Term) -> usize {
        match self.parked.remove(&document.canonical_key()) {
            Some(parked) => {
                let resumed = parked.tasks.len();
                tracing::trace!(document = %document, resumed, "resuming parked work");
                self.stack.extend(parked.tasks.into_iter().rev());
                resumed
            }
            None => 0,
        }
    }

    /// Process work until the query completes or everything left is parked
    pub fn run(
        &mut self,
        store: &mut Store,
        mut fetcher: Option<&mut dyn Fetcher>,
        sink: &mut dyn MatchSink,
    ) -> Result<ExecutionStatus> {
        if self.aborted {
            return Err(QueryError::ExecutionAborted);
        }
        if self.complete {
            return Ok(ExecutionStatus::Complete);
        }

        let span = tracing::debug_span!("query_run", name = ?self.query.name);
        let _g = span.enter();

        if let Some(f) = fetcher.as_mut() {
            self.resume_settled(&**f);
        }

        while let Some(task) = self.stack.pop() {
            self.fuel_used += 1;
            if let Some(limit) = self.query.options.max_fuel {
                if self.fuel_used > limit {
                    self.aborted = true;
                    return Err(QueryError::FuelLimitExceeded {
                        used: self.fuel_used,
                        limit,
                    });
                }
            }

            if let Some(f) = fetcher.as_mut() {
                match self.check_documents(&task, store, &mut **f) {
                    DocumentCheck::Ready => {}
                    DocumentCheck::Retry => {
                        self.stack.push(task);
                        continue;
                    }
                    DocumentCheck::Suspend(document) => {
                        self.park(document, task);
                        continue;
                    }
                }
            }

            self.process(task, store, sink);
        }

        if self.complete {
            tracing::debug!(
                delivered = self.delivered,
                fuel = self.fuel_used,
                "query complete"
            );
            Ok(ExecutionStatus::Complete)
        } else {
            let waiting = self.waiting_on();
            tracing::debug!(documents = waiting.len(), "query waiting on documents");
            Ok(ExecutionStatus::Waiting(waiting))
        }
    }

    fn open_branch(&mut self, pattern: &'q GraphPattern, owner: BranchOwner) -> BranchId {
        self.branches.push(Branch {
            pattern,
            owner,
            outstanding: 0,
            results: Vec::new(),
        });
        self.branches.len() - 1
    }

    fn spawn(&mut self, task: MatchTask) {
        self.branches[task.branch].outstanding += 1;
        self.stack.push(task);
    }

    fn park(&mut self, document: Term, task: MatchTask) {
        tracing::trace!(document = %document, branch = task.branch, "parking task");
        self.parked
            .entry(document.canonical_key())
            .or_insert_with(|| Parked {
                document,
                tasks: Vec::new(),
            })
            .tasks
            .push(task);
    }

    /// Requeue parked work whose document settled without `document_ready`
    fn resume_settled(&mut self, fetcher: &dyn Fetcher) {
        let settled: Vec<Term> = self
            .parked
            .values()
            .filter(|p| fetcher.state(&p.document).is_settled())
            .map(|p| p.document.clone())
            .collect();
        for document in settled {
            self.document_ready(&document);
        }
    }

    /// Check the documents behind bound subjects and objects of the task
    fn check_documents(
        &self,
        task: &MatchTask,
        store: &mut Store,
        fetcher: &mut dyn Fetcher,
    ) -> DocumentCheck {
        let pattern = self.branches[task.branch].pattern;
        let statements = pattern.statements();

        for &index in &task.remaining {
            let st = &statements[index];
            for term in [&st.subject, &st.object] {
                let Some(name) = term.as_variable() else {
                    continue;
                };
                let Some(bound) = task.bindings.get(name) else {
                    continue;
                };
                let Some(document) = fetcher.document_of(bound) else {
                    continue;
                };
                match fetcher.state(&document) {
                    DocumentState::Fetched | DocumentState::Failed => {}
                    DocumentState::Requested => return DocumentCheck::Suspend(document),
                    DocumentState::Unrequested => {
                        return if fetcher.fetch(store, &document, bound).is_settled() {
                            DocumentCheck::Retry
                        } else {
                            DocumentCheck::Suspend(document)
                        };
                    }
                }
            }
        }
        DocumentCheck::Ready
    }

    fn process(&mut self, task: MatchTask, store: &Store, sink: &mut dyn MatchSink) {
        let branch = task.branch;
        let pattern = self.branches[branch].pattern;

        if task.remaining.is_empty() {
            self.statements_matched(branch, task.bindings, sink);
            self.finish(branch, sink);
            return;
        }

        let statements = pattern.statements();
        let mut prepared: Vec<_> = task
            .remaining
            .iter()
            .map(|&i| prepare(store, &statements[i], i, &task.bindings))
            .collect();
        reorder(&mut prepared);

        let head = &prepared[0];
        let rest: Vec<usize> = prepared[1..].iter().map(|p| p.index).collect();
        let statement = &statements[head.index];
        tracing::trace!(
            branch,
            statement = %statement,
            candidates = head.candidates.len(),
            "matching"
        );

        let children: Vec<MatchTask> = head
            .candidates
            .iter()
            .filter_map(|candidate| unify_statement(store, pattern, statement, candidate, &task.bindings))
            .map(|bindings| MatchTask {
                branch,
                remaining: rest.clone(),
                bindings,
            })
            .collect();

        for child in children.into_iter().rev() {
            self.spawn(child);
        }
        self.finish(branch, sink);
    }

    /// A branch matched all of its statements
    fn statements_matched(&mut self, branch: BranchId, bindings: Bindings, sink: &mut dyn MatchSink) {
        let pattern = self.branches[branch].pattern;
        if pattern.optional().is_empty() {
            self.deliver(branch, bindings, sink);
            return;
        }

        let junction = self.junctions.len();
        let ids: Vec<BranchId> = pattern
            .optional()
            .iter()
            .map(|opt| self.open_branch(opt, BranchOwner::Optional(junction)))
            .collect();
        tracing::trace!(branch, junction, optionals = ids.len(), "opening junction");

        // the junction holds the parent open until it delivers
        self.branches[branch].outstanding += 1;
        self.junctions.push(Junction {
            parent: branch,
            trunk: bindings.clone(),
            branches: ids.clone(),
            remaining: ids.len(),
        });

        for (&id, opt) in ids.iter().zip(pattern.optional()).rev() {
            self.spawn(MatchTask {
                branch: id,
                remaining: (0..opt.len()).collect(),
                bindings: bindings.clone(),
            });
        }
    }

    fn deliver(&mut self, branch: BranchId, bindings: Bindings, sink: &mut dyn MatchSink) {
        match self.branches[branch].owner {
            BranchOwner::Root => {
                self.delivered += 1;
                sink.on_match(&bindings);
            }
            BranchOwner::Optional(_) => self.branches[branch].results.push(bindings),
        }
    }

    fn finish(&mut self, branch: BranchId, sink: &mut dyn MatchSink) {
        let b = &mut self.branches[branch];
        b.outstanding -= 1;
        if b.outstanding > 0 {
            return;
        }
        match b.owner {
            BranchOwner::Root => {
                self.complete = true;
                sink.on_done();
            }
            BranchOwner::Optional(junction) => self.optional_finished(junction, sink),
        }
    }

    fn optional_finished(&mut self, junction: JunctionId, sink: &mut dyn MatchSink) {
        let j = &mut self.junctions[junction];
        j.remaining -= 1;
        if j.remaining > 0 {
            return;
        }

        let parent = j.parent;
        let trunk = std::mem::take(&mut j.trunk);
        let ids = std::mem::take(&mut j.branches);

        let mut combined = vec![trunk];
        for id in ids {
            let results = std::mem::take(&mut self.branches[id].results);
            if results.is_empty() {
                continue;
            }
            combined = combined
                .iter()
                .flat_map(|left| {
                    results.iter().map(move |right| {
                        let mut merged = left.clone();
                        merged.merge(right);
                        merged
                    })
                })
                .collect();
        }
        tracing::debug!(junction, solutions = combined.len(), "junction complete");

        for bindings in combined {
            self.deliver(parent, bindings, sink);
        }
        self.finish(parent, sink);
    }
}

/// Run `query` to completion without fetching and collect its solutions
pub fn query(store: &mut Store, query: &Query) -> Result<Vec<Bindings>> {
    let mut exec = QueryExecution::new(query);
    let mut sink = CollectSink::default();
    exec.run(store, None, &mut sink)?;
    Ok(sink.rows)
}
