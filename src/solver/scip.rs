//! SCIP-backed solving session
//!
//! Wraps the `russcip` bindings behind [`SolverBackend`]. Every session is
//! a fresh SCIP problem instance with its own time limit and verbosity, so
//! independent trainings in one process never share solver state. The
//! session owns all SCIP resources; dropping it (on any exit path) frees
//! them.

use std::rc::Rc;

use log::debug;
use russcip::model::{Model, ObjSense, ProblemCreated};
use russcip::retcode::Retcode;
use russcip::status::Status;
use russcip::variable::{VarType, Variable};
use russcip::{ProblemOrSolving, WithSolutions};

use crate::core::{Result, SolveOutcome, SvmConfig, SvmError};
use crate::solver::{SolveResult, SolverBackend, VarId, VarKind};

// SCIP's notion of infinity
const SCIP_INFINITY: f64 = 1e20;

fn clamp_bound(bound: f64) -> f64 {
    bound.clamp(-SCIP_INFINITY, SCIP_INFINITY)
}

fn retcode_error(retcode: Retcode) -> SvmError {
    SvmError::Solver(format!("SCIP returned {retcode:?}"))
}

/// One SCIP solving session, scoped to a single training call
pub struct ScipSession {
    model: Model<ProblemCreated>,
    vars: Vec<Rc<Variable>>,
}

impl ScipSession {
    /// Create a session configured from the training options
    pub fn new(name: &str, config: &SvmConfig) -> Result<Self> {
        let model = Model::new()
            .set_real_param("limits/time", config.time_limit)
            .map_err(retcode_error)?
            .set_int_param("display/verblevel", config.verbosity)
            .map_err(retcode_error)?
            .include_default_plugins()
            .create_prob(name)
            .set_obj_sense(ObjSense::Minimize);
        Ok(Self {
            model,
            vars: Vec::new(),
        })
    }

    /// Number of variables registered so far
    pub fn n_vars(&self) -> usize {
        self.vars.len()
    }

    fn resolve(&self, terms: &[(VarId, f64)]) -> (Vec<Rc<Variable>>, Vec<f64>) {
        let vars = terms
            .iter()
            .map(|&(id, _)| Rc::clone(&self.vars[id.index()]))
            .collect();
        let coefs = terms.iter().map(|&(_, c)| c).collect();
        (vars, coefs)
    }
}

impl SolverBackend for ScipSession {
    fn add_var(&mut self, kind: VarKind, lb: f64, ub: f64, obj_coef: f64, name: &str) -> VarId {
        let var_type = match kind {
            VarKind::Continuous => VarType::Continuous,
            VarKind::Binary => VarType::Binary,
        };
        let var = self
            .model
            .add_var(clamp_bound(lb), clamp_bound(ub), obj_coef, name, var_type);
        self.vars.push(var);
        VarId(self.vars.len() - 1)
    }

    fn add_linear(&mut self, terms: &[(VarId, f64)], lhs: f64, rhs: f64, name: &str) {
        let (vars, coefs) = self.resolve(terms);
        self.model
            .add_cons(vars, &coefs, clamp_bound(lhs), clamp_bound(rhs), name);
    }

    fn add_quadratic(
        &mut self,
        quad_terms: &[(VarId, VarId, f64)],
        lin_terms: &[(VarId, f64)],
        lhs: f64,
        rhs: f64,
        name: &str,
    ) {
        let (lin_vars, mut lin_coefs) = self.resolve(lin_terms);
        let quad_vars_1 = quad_terms
            .iter()
            .map(|&(a, _, _)| Rc::clone(&self.vars[a.index()]))
            .collect();
        let quad_vars_2 = quad_terms
            .iter()
            .map(|&(_, b, _)| Rc::clone(&self.vars[b.index()]))
            .collect();
        let mut quad_coefs: Vec<f64> = quad_terms.iter().map(|&(_, _, c)| c).collect();
        self.model.add_cons_quadratic(
            lin_vars,
            &mut lin_coefs,
            quad_vars_1,
            quad_vars_2,
            &mut quad_coefs,
            clamp_bound(lhs),
            clamp_bound(rhs),
            name,
        );
    }

    fn solve(self) -> Result<SolveResult> {
        let solved = self.model.solve();
        let status = solved.status();
        debug!("SCIP finished with status {status:?}");

        let values = solved.best_sol().map(|sol| {
            self.vars
                .iter()
                .map(|var| sol.val(Rc::clone(var)))
                .collect::<Vec<f64>>()
        });

        let outcome = match status {
            Status::Optimal => SolveOutcome::Optimal,
            Status::Infeasible => SolveOutcome::Infeasible,
            // Time limit and every other early stop: usable iff an
            // incumbent was found.
            _ if values.is_some() => SolveOutcome::TimeLimitWithIncumbent,
            _ => SolveOutcome::TimeLimitNoIncumbent,
        };
        Ok(SolveResult { outcome, values })
    }
}
