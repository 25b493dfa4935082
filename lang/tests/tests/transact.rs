use lumen_elab::*;
use lumen_tests::*;
use pretty_assertions::assert_eq;

#[test]
fn orelse_rolls_back_the_failed_branch() {
    let mut elab = new_elab();
    let nat = c(&mut elab, "Nat");
    let m = elab.mk_fresh_expr_mvar(nat, MetaKind::Natural, None);
    let m_id = mvar_id(&elab, m);

    let res = elab.orelse(
        |elab| {
            let five = c(elab, "five");
            elab.assign_expr_mvar(m_id, five);
            // fail after mutating
            elab.get_const_info(&Name::new("ghost"))?;
            Ok(0)
        },
        |elab| {
            // no residue from the failed branch
            assert_eq!(elab.mctx.get_expr_assignment(m_id), None);
            let one = c(elab, "one");
            elab.assign_expr_mvar(m_id, one);
            Ok(7)
        },
    );
    assert_eq!(res.unwrap(), 7);
    let one = c(&mut elab, "one");
    assert_eq!(elab.mctx.get_expr_assignment(m_id), Some(one));
}

#[test]
fn orelse_keeps_the_first_branch_on_success() {
    let mut elab = new_elab();
    let nat = c(&mut elab, "Nat");
    let m = elab.mk_fresh_expr_mvar(nat, MetaKind::Natural, None);
    let m_id = mvar_id(&elab, m);

    let res = elab.orelse(
        |elab| {
            let five = c(elab, "five");
            elab.assign_expr_mvar(m_id, five);
            Ok(1)
        },
        |_elab| panic!("second branch must not run"),
    );
    assert_eq!(res.unwrap(), 1);
    let five = c(&mut elab, "five");
    assert_eq!(elab.mctx.get_expr_assignment(m_id), Some(five));
}

#[test]
fn orelse_rolls_back_environment_edits() {
    let mut elab = new_elab();
    assert_eq!(elab.env.reducibility(&Name::new("double")), Some(Reducibility::Regular));

    let res: Result<()> = elab.orelse(
        |elab| {
            let mut env = elab.env.clone();
            env.set_reducibility(&Name::new("double"), Reducibility::Irreducible);
            elab.set_env(env);
            elab.get_const_info(&Name::new("ghost"))?;
            Ok(())
        },
        |elab| {
            assert_eq!(
                elab.env.reducibility(&Name::new("double")),
                Some(Reducibility::Regular)
            );
            Ok(())
        },
    );
    res.unwrap();
    assert_eq!(elab.env.reducibility(&Name::new("double")), Some(Reducibility::Regular));
}

#[test]
fn orelse_merge_errors_combines_both_failures_in_order() {
    let mut elab = new_elab();
    let res: Result<i32> = elab.orelse_merge_errors(
        |elab| {
            elab.get_const_info(&Name::new("X"))?;
            Ok(0)
        },
        |elab| {
            elab.get_const_info(&Name::new("Y"))?;
            Ok(0)
        },
        |a, b| {
            let ElabError::UnknownConst(na) = &a.error else { panic!("unexpected error") };
            let ElabError::UnknownConst(nb) = &b.error else { panic!("unexpected error") };
            let merged = Name::new(format!("{}-{}", na, nb));
            ElabErrorEntry { error: ElabError::UnknownConst(merged), ..a }
        },
    );
    let err = res.unwrap_err();
    assert!(matches!(&err.error, ElabError::UnknownConst(n) if n.0 == "X-Y"));
}

#[test]
fn orelse_merge_errors_prefers_the_second_branch_result() {
    let mut elab = new_elab();
    let res = elab.orelse_merge_errors(
        |elab| {
            elab.get_const_info(&Name::new("X"))?;
            Ok(0)
        },
        |_elab| Ok(42),
        |_a, _b| panic!("merge must not run when the second branch succeeds"),
    );
    assert_eq!(res.unwrap(), 42);
}

#[test]
fn commit_when_some_keeps_state_only_for_some() {
    let mut elab = new_elab();
    let nat = c(&mut elab, "Nat");
    let m = elab.mk_fresh_expr_mvar(nat, MetaKind::Natural, None);
    let m_id = mvar_id(&elab, m);

    // `None` rolls back
    let res = elab.commit_when_some(|elab| {
        let five = c(elab, "five");
        elab.assign_expr_mvar(m_id, five);
        Ok(None::<i32>)
    });
    assert_eq!(res.unwrap(), None);
    assert_eq!(elab.mctx.get_expr_assignment(m_id), None);

    // `Some` commits
    let res = elab.commit_when_some(|elab| {
        let five = c(elab, "five");
        elab.assign_expr_mvar(m_id, five);
        Ok(Some(3))
    });
    assert_eq!(res.unwrap(), Some(3));
    let five = c(&mut elab, "five");
    assert_eq!(elab.mctx.get_expr_assignment(m_id), Some(five));
}

#[test]
fn commit_when_some_rolls_back_on_failure_and_propagates() {
    let mut elab = new_elab();
    let nat = c(&mut elab, "Nat");
    let m = elab.mk_fresh_expr_mvar(nat, MetaKind::Natural, None);
    let m_id = mvar_id(&elab, m);

    let res: Result<Option<i32>> = elab.commit_when_some(|elab| {
        let five = c(elab, "five");
        elab.assign_expr_mvar(m_id, five);
        elab.get_const_info(&Name::new("ghost"))?;
        Ok(Some(3))
    });
    assert!(matches!(res.unwrap_err().error, ElabError::UnknownConst(_)));
    assert_eq!(elab.mctx.get_expr_assignment(m_id), None);
}

#[test]
fn with_new_mctx_depth_sandboxes_the_attempt() {
    let mut elab = new_elab();
    assert_eq!(elab.mctx.depth(), 0);

    let inner_mvar = elab
        .with_new_mctx_depth(|elab| {
            assert_eq!(elab.mctx.depth(), 1);
            let nat = c(elab, "Nat");
            let m = elab.mk_fresh_expr_mvar(nat, MetaKind::Natural, None);
            let m_id = mvar_id(elab, m);
            assert_eq!(elab.get_mvar_decl(m_id)?.depth, 1);
            Ok(m_id)
        })
        .unwrap();

    // the whole context is restored, success or not
    assert_eq!(elab.mctx.depth(), 0);
    assert!(elab.mctx.find_decl(inner_mvar).is_none());
}

#[test]
fn fresh_ids_are_never_reused_across_rollback() {
    let mut elab = new_elab();
    let saved = elab.snapshot();
    let a = elab.fresh_fvar_id();
    let m_a = elab.fresh_mvar_id();
    elab.rollback(saved);
    let b = elab.fresh_fvar_id();
    let m_b = elab.fresh_mvar_id();
    assert_ne!(a, b);
    assert_ne!(m_a, m_b);
}

#[test]
fn synth_instance_cache_save_reset_restore_pair() {
    let mut elab = new_elab();
    let nat = c(&mut elab, "Nat");
    elab.caches.synth_instance.insert(nat, None);

    let saved = elab.save_and_reset_synth_instance_cache();
    assert!(elab.caches.synth_instance.is_empty());
    elab.restore_synth_instance_cache(saved);
    assert_eq!(elab.caches.synth_instance.len(), 1);
}

#[test]
fn postponed_problems_queue_in_order() {
    let mut elab = new_elab();
    let zero = elab.terms.mk_zero();
    let one = elab.terms.mk_succ(zero);
    let u = elab.mk_fresh_level_mvar();

    elab.push_postponed(PostponedEntry { lhs: u, rhs: zero });
    elab.push_postponed(PostponedEntry { lhs: one, rhs: u });
    let drained = elab.take_postponed();
    assert_eq!(drained.len(), 2);
    assert!(elab.take_postponed().is_empty());
    assert_eq!(drained[0].lhs, u);
    assert_eq!(drained[1].rhs, u);
}
