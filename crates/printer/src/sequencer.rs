//! The print cycle as a pure state machine.
//!
//! [`transition`] maps the current state and one step to the next state plus the effects the
//! job must perform. It never touches a document or a host, so every path through a cycle can
//! be exercised without either.

use bus::HookError;
use core_types::ErrorLocation;
use std::fmt;
use std::time::Duration;

/// Wait between the last pre-print step and printing. Some engines print blank pages without it.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Why a cycle stopped without anything being wrong with caller hooks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    NoContentSource,
    ContentUndefined,
    ContentNull,
    ContentNotFound,
    SurfaceUnavailable,
    /// The surface disappeared before printing, usually replaced by a newer print.
    SurfaceLost,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            AbortReason::NoContentSource => {
                "did not receive a content source option or a content source passed to print"
            }
            AbortReason::ContentUndefined => {
                "the content source returned an unattached reference; make sure the reference \
                 is attached to the element you want to print"
            }
            AbortReason::ContentNull => {
                "there is nothing to print because the content source returned null; make sure \
                 the content exists before printing"
            }
            AbortReason::ContentNotFound => "could not locate the node returned by the content source",
            AbortReason::SurfaceUnavailable => "the print surface could not be created",
            AbortReason::SurfaceLost => {
                "printing failed because the print surface was removed before it could print"
            }
        };
        f.write_str(msg)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrintState {
    Idle,
    AwaitingBeforeGetContent,
    ResolvingContent,
    Cloning,
    AwaitingResources,
    AwaitingBeforePrint,
    Settling,
    Printing,
    AwaitingAfterPrint,
    Cleanup,
    Done,
    Aborted(AbortReason),
    Errored(ErrorLocation),
}

impl PrintState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PrintState::Done | PrintState::Aborted(_) | PrintState::Errored(_)
        )
    }
}

/// Something that happened, as seen by the state machine.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Start,
    BeforeGetContentSettled(Result<(), HookError>),
    ContentResolved(Result<(), AbortReason>),
    Cloned,
    CloneFailed(AbortReason),
    ResourcesReady,
    BeforePrintSettled(Result<(), HookError>),
    SettleElapsed { surface_present: bool },
    NativePrintDone,
    CustomPrintSettled(Result<(), HookError>),
    AfterPrintDone,
    CleanedUp,
}

/// Work the job performs on behalf of the state machine.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    RunBeforeGetContent,
    ResolveContent,
    CloneContent,
    AwaitResources,
    RunBeforePrint,
    StartSettleTimer(Duration),
    InvokeCustomPrint,
    InvokeNativePrint,
    RunAfterPrint,
    Cleanup { remove_surface: bool },
    ReportError { location: ErrorLocation, error: HookError },
    Abort(AbortReason),
}

/// The parts of the options that shape the cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Plan {
    pub before_get_content: bool,
    pub before_print: bool,
    pub custom_print: bool,
    pub preserve_after_print: bool,
}

pub fn transition(state: &PrintState, step: Step, plan: &Plan) -> (PrintState, Vec<Effect>) {
    use PrintState as S;

    match (state, step) {
        (S::Idle, Step::Start) if plan.before_get_content => {
            (S::AwaitingBeforeGetContent, vec![Effect::RunBeforeGetContent])
        }
        (S::Idle, Step::Start) => (S::ResolvingContent, vec![Effect::ResolveContent]),

        (S::AwaitingBeforeGetContent, Step::BeforeGetContentSettled(result)) => match result {
            Ok(()) => (S::ResolvingContent, vec![Effect::ResolveContent]),
            Err(error) => fail(ErrorLocation::BeforeGetContent, error),
        },

        (S::ResolvingContent, Step::ContentResolved(result)) => match result {
            Ok(()) => (S::Cloning, vec![Effect::CloneContent]),
            Err(reason) => (S::Aborted(reason), vec![Effect::Abort(reason)]),
        },

        (S::Cloning, Step::Cloned) => (S::AwaitingResources, vec![Effect::AwaitResources]),
        (S::Cloning, Step::CloneFailed(reason)) => (S::Aborted(reason), vec![Effect::Abort(reason)]),

        (S::AwaitingResources, Step::ResourcesReady) if plan.before_print => {
            (S::AwaitingBeforePrint, vec![Effect::RunBeforePrint])
        }
        (S::AwaitingResources, Step::ResourcesReady) => settle(),

        (S::AwaitingBeforePrint, Step::BeforePrintSettled(result)) => match result {
            Ok(()) => settle(),
            Err(error) => fail(ErrorLocation::BeforePrint, error),
        },

        (S::Settling, Step::SettleElapsed { surface_present }) => {
            if !surface_present {
                let reason = AbortReason::SurfaceLost;
                (S::Aborted(reason), vec![Effect::Abort(reason)])
            } else if plan.custom_print {
                (S::Printing, vec![Effect::InvokeCustomPrint])
            } else {
                (S::Printing, vec![Effect::InvokeNativePrint])
            }
        }

        (S::Printing, Step::NativePrintDone) if !plan.custom_print => after_print(),
        (S::Printing, Step::CustomPrintSettled(result)) if plan.custom_print => match result {
            Ok(()) => after_print(),
            // the surface stays for the caller to inspect
            Err(error) => fail(ErrorLocation::Print, error),
        },

        (S::AwaitingAfterPrint, Step::AfterPrintDone) => (
            S::Cleanup,
            vec![Effect::Cleanup {
                remove_surface: !plan.preserve_after_print,
            }],
        ),

        (S::Cleanup, Step::CleanedUp) => (S::Done, Vec::new()),

        (state, _) => (state.clone(), Vec::new()),
    }
}

fn settle() -> (PrintState, Vec<Effect>) {
    (PrintState::Settling, vec![Effect::StartSettleTimer(SETTLE_DELAY)])
}

fn after_print() -> (PrintState, Vec<Effect>) {
    (PrintState::AwaitingAfterPrint, vec![Effect::RunAfterPrint])
}

fn fail(location: ErrorLocation, error: HookError) -> (PrintState, Vec<Effect>) {
    (
        PrintState::Errored(location),
        vec![Effect::ReportError { location, error }],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed `steps` from `Idle`, returning every state visited and all effects produced.
    fn run(plan: Plan, steps: Vec<Step>) -> (Vec<PrintState>, Vec<Effect>) {
        let mut state = PrintState::Idle;
        let mut states = Vec::new();
        let mut effects = Vec::new();
        for step in steps {
            let (next, mut out) = transition(&state, step, &plan);
            state = next;
            states.push(state.clone());
            effects.append(&mut out);
        }
        (states, effects)
    }

    #[test]
    fn native_print_happy_path() {
        let (states, effects) = run(
            Plan::default(),
            vec![
                Step::Start,
                Step::ContentResolved(Ok(())),
                Step::Cloned,
                Step::ResourcesReady,
                Step::SettleElapsed { surface_present: true },
                Step::NativePrintDone,
                Step::AfterPrintDone,
                Step::CleanedUp,
            ],
        );
        assert_eq!(
            states,
            vec![
                PrintState::ResolvingContent,
                PrintState::Cloning,
                PrintState::AwaitingResources,
                PrintState::Settling,
                PrintState::Printing,
                PrintState::AwaitingAfterPrint,
                PrintState::Cleanup,
                PrintState::Done,
            ]
        );
        assert_eq!(
            effects,
            vec![
                Effect::ResolveContent,
                Effect::CloneContent,
                Effect::AwaitResources,
                Effect::StartSettleTimer(SETTLE_DELAY),
                Effect::InvokeNativePrint,
                Effect::RunAfterPrint,
                Effect::Cleanup { remove_surface: true },
            ]
        );
    }

    #[test]
    fn hooks_gate_content_and_printing() {
        let plan = Plan {
            before_get_content: true,
            before_print: true,
            custom_print: true,
            preserve_after_print: true,
        };
        let (states, effects) = run(
            plan,
            vec![
                Step::Start,
                Step::BeforeGetContentSettled(Ok(())),
                Step::ContentResolved(Ok(())),
                Step::Cloned,
                Step::ResourcesReady,
                Step::BeforePrintSettled(Ok(())),
                Step::SettleElapsed { surface_present: true },
                Step::CustomPrintSettled(Ok(())),
                Step::AfterPrintDone,
            ],
        );
        assert_eq!(states[0], PrintState::AwaitingBeforeGetContent);
        assert_eq!(states[4], PrintState::AwaitingBeforePrint);
        assert!(effects.contains(&Effect::InvokeCustomPrint));
        assert!(!effects.contains(&Effect::InvokeNativePrint));
        assert_eq!(
            effects.last(),
            Some(&Effect::Cleanup { remove_surface: false })
        );
    }

    #[test]
    fn hook_rejections_are_reported_with_their_location() {
        let plan = Plan {
            before_get_content: true,
            ..Plan::default()
        };
        let (states, effects) = run(
            plan,
            vec![
                Step::Start,
                Step::BeforeGetContentSettled(Err(HookError::new("nope"))),
                Step::ContentResolved(Ok(())),
            ],
        );
        assert_eq!(
            states.last(),
            Some(&PrintState::Errored(ErrorLocation::BeforeGetContent))
        );
        assert_eq!(
            effects.last(),
            Some(&Effect::ReportError {
                location: ErrorLocation::BeforeGetContent,
                error: HookError::new("nope"),
            })
        );
    }

    #[test]
    fn custom_print_failure_skips_after_print_and_cleanup() {
        let plan = Plan {
            custom_print: true,
            ..Plan::default()
        };
        let (states, effects) = run(
            plan,
            vec![
                Step::Start,
                Step::ContentResolved(Ok(())),
                Step::Cloned,
                Step::ResourcesReady,
                Step::SettleElapsed { surface_present: true },
                Step::NativePrintDone,
                Step::CustomPrintSettled(Err(HookError::new("x"))),
            ],
        );
        assert_eq!(states[5], PrintState::Printing);
        assert_eq!(states[6], PrintState::Errored(ErrorLocation::Print));
        assert!(!effects.contains(&Effect::RunAfterPrint));
        assert!(!effects.iter().any(|e| matches!(e, Effect::Cleanup { .. })));
    }

    #[test]
    fn content_problems_abort_without_reporting() {
        for reason in [AbortReason::ContentUndefined, AbortReason::ContentNull] {
            let (states, effects) =
                run(Plan::default(), vec![Step::Start, Step::ContentResolved(Err(reason))]);
            assert_eq!(states.last(), Some(&PrintState::Aborted(reason)));
            assert!(!effects.iter().any(|e| matches!(e, Effect::ReportError { .. })));
        }
    }

    #[test]
    fn lost_surface_aborts_before_printing() {
        let (states, effects) = run(
            Plan::default(),
            vec![
                Step::Start,
                Step::ContentResolved(Ok(())),
                Step::Cloned,
                Step::ResourcesReady,
                Step::SettleElapsed { surface_present: false },
            ],
        );
        assert_eq!(states.last(), Some(&PrintState::Aborted(AbortReason::SurfaceLost)));
        assert!(!effects.contains(&Effect::InvokeNativePrint));
    }

    #[test]
    fn unexpected_steps_change_nothing() {
        for state in [PrintState::Idle, PrintState::AwaitingResources, PrintState::Done] {
            let (next, effects) = transition(&state, Step::AfterPrintDone, &Plan::default());
            assert_eq!(next, state);
            assert!(effects.is_empty());
        }
        let (next, _) = transition(&PrintState::Done, Step::Start, &Plan::default());
        assert_eq!(next, PrintState::Done);
    }
}
